//! Consensus module - block version field, hard-fork gate, coinbase split

mod version;
mod hardfork;
mod coinbase;

pub use version::*;
pub use hardfork::*;
pub use coinbase::*;
