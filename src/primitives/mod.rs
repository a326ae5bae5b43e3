//! Primitives module - scripts, the mutable transaction skeleton and the
//! canonical byte codec they share

mod codec;
mod script;
mod transaction;

pub use codec::*;
pub use script::*;
pub use transaction::*;
