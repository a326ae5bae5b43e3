//! Cryptography module - BLAKE3 content hashing

mod hash;

pub use hash::*;
