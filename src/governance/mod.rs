//! Governance module - the treasury command surface

mod service;

pub use service::*;
