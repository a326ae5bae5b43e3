//! Mutable transaction skeleton
//!
//! Treasury proposals carry an unsigned (or partially signed) funding
//! transaction. Only its structure matters here: inputs can be trimmed and
//! their unlocking scripts cleared, and the whole thing can be hashed and
//! read back from its canonical bytes.

use serde::{Deserialize, Serialize};
use crate::crypto::{Hash, hash_bytes};
use super::{ByteReader, DecodeError, Script};

/// Reference to a previous transaction output
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    /// Hash of the transaction containing the output
    pub hash: Hash,
    /// Index of the output in that transaction
    pub index: u32,
}

impl OutPoint {
    pub fn new(hash: Hash, index: u32) -> Self {
        Self { hash, index }
    }
}

/// A transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    /// Output being spent
    pub prevout: OutPoint,
    /// Unlocking script
    pub script_sig: Script,
    /// Sequence number
    pub sequence: u32,
}

impl TxIn {
    /// Create an unsigned input with a final sequence number
    pub fn new(prevout: OutPoint) -> Self {
        Self {
            prevout,
            script_sig: Script::default(),
            sequence: u32::MAX,
        }
    }
}

/// A transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    /// Amount in base units
    pub value: i64,
    /// Locking script of the recipient
    pub script_pubkey: Script,
}

/// A transaction under construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutableTransaction {
    /// Transaction version
    pub version: i32,
    /// Transaction inputs
    pub inputs: Vec<TxIn>,
    /// Transaction outputs
    pub outputs: Vec<TxOut>,
    /// Lock time (block height or timestamp)
    pub lock_time: u32,
}

impl Default for MutableTransaction {
    fn default() -> Self {
        Self {
            version: 2,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }
}

impl MutableTransaction {
    /// Create a new transaction
    pub fn new(inputs: Vec<TxIn>, outputs: Vec<TxOut>) -> Self {
        Self {
            inputs,
            outputs,
            ..Self::default()
        }
    }

    /// Append the canonical byte form (scripts included)
    pub fn write_to(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.version.to_le_bytes());

        bytes.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            bytes.extend_from_slice(&input.prevout.hash.0);
            bytes.extend_from_slice(&input.prevout.index.to_le_bytes());
            input.script_sig.write_to(bytes);
            bytes.extend_from_slice(&input.sequence.to_le_bytes());
        }

        bytes.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            bytes.extend_from_slice(&output.value.to_le_bytes());
            output.script_pubkey.write_to(bytes);
        }

        bytes.extend_from_slice(&self.lock_time.to_le_bytes());
    }

    /// Serialize to the canonical byte form
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes);
        bytes
    }

    /// Calculate transaction hash
    pub fn hash(&self) -> Hash {
        hash_bytes(&self.to_bytes())
    }

    /// Read the canonical byte form written by `write_to`
    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let version = reader.read_i32()?;

        let mut inputs = Vec::new();
        for _ in 0..reader.read_count()? {
            let prevout = OutPoint::new(reader.read_hash()?, reader.read_u32()?);
            let script_sig = Script::read_from(reader)?;
            let sequence = reader.read_u32()?;
            inputs.push(TxIn { prevout, script_sig, sequence });
        }

        let mut outputs = Vec::new();
        for _ in 0..reader.read_count()? {
            let value = reader.read_i64()?;
            let script_pubkey = Script::read_from(reader)?;
            outputs.push(TxOut { value, script_pubkey });
        }

        let lock_time = reader.read_u32()?;
        Ok(Self { version, inputs, outputs, lock_time })
    }
}
