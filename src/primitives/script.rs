//! Raw script byte strings
//!
//! Scripts are opaque to this crate apart from the two spendability checks
//! the treasury needs before accepting a redeem script.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::constants::MAX_SCRIPT_SIZE;
use super::{ByteReader, DecodeError, write_var_bytes};

const OP_RETURN: u8 = 0x6a;

/// A serialized script (scriptSig, scriptPubKey or redeem script)
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Script(pub Vec<u8>);

impl Script {
    pub fn new(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }

    /// Parse a script from hex
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        Ok(Script(hex::decode(hex)?))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Provably unspendable: `OP_RETURN` prefixed or oversized
    pub fn is_unspendable(&self) -> bool {
        self.0.first() == Some(&OP_RETURN) || self.0.len() > MAX_SCRIPT_SIZE
    }

    /// Append the length-prefixed canonical form
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        write_var_bytes(buf, &self.0);
    }

    /// Read the length-prefixed canonical form
    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Script(reader.read_var_bytes()?))
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}
