//! Treasury module - governance proposals and their mempool

mod proposal;
mod mempool;

pub use proposal::*;
pub use mempool::*;
