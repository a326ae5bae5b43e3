//! Treasury proposal record
//!
//! A proposal asks the treasury to fund a transaction. It lives for a fixed
//! window after its last edit and is swept from the mempool afterwards.

use serde::{Deserialize, Serialize};
use crate::constants::{MAX_DESCRIPTION_LENGTH, MAX_HEADLINE_LENGTH, MAX_TX_INPUTS, PROPOSAL_LIFETIME};
use crate::crypto::{Hash, hash_bytes};
use crate::primitives::{ByteReader, DecodeError, MutableTransaction, write_var_bytes};

/// A community funding proposal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryProposal {
    /// Record format version
    pub version: u32,
    /// Content hash assigned at creation, the proposal's identity
    pub hash_id: Hash,
    /// Creation time (Unix seconds)
    pub creation_time: u32,
    /// Last edit time (Unix seconds)
    pub last_edited: u32,
    /// Expiration time (Unix seconds)
    pub expire_time: u32,
    /// Short title
    pub headline: String,
    /// Full text
    pub description: String,
    /// Transaction paying out the requested funds
    pub funding_tx: MutableTransaction,
    /// Whether the local signer agreed to this proposal (memory-only)
    #[serde(skip)]
    agreed: bool,
}

/// JSON view of a proposal
#[derive(Debug, Clone, Serialize)]
pub struct ProposalSummary {
    pub id: String,
    pub bytes: usize,
    pub version: u32,
    pub creation_time: u32,
    pub last_edited: u32,
    pub expire_time: u32,
    pub expired: bool,
    pub agreed: bool,
    pub headline: String,
    pub description: String,
    pub inputs: usize,
    pub outputs: usize,
}

impl TreasuryProposal {
    /// Create an empty proposal
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_null(&mut self) {
        *self = Self::default();
    }

    /// True iff identical to a freshly constructed proposal
    pub fn is_null(&self) -> bool {
        *self == Self::default()
    }

    pub fn is_headline_valid(&self) -> bool {
        self.headline.len() <= MAX_HEADLINE_LENGTH
    }

    pub fn is_description_valid(&self) -> bool {
        self.description.len() <= MAX_DESCRIPTION_LENGTH
    }

    /// Expired at `time` (inclusive of the exact expiry second)
    pub fn is_expired(&self, time: u32) -> bool {
        time >= self.expire_time
    }

    pub fn is_agreed(&self) -> bool {
        self.agreed
    }

    /// Mark as agreed. Returns `false` if it already was.
    pub fn set_agreed(&mut self) -> bool {
        if self.agreed {
            return false;
        }
        self.agreed = true;
        true
    }

    /// Withdraw agreement. Returns `false` if there was none.
    pub fn unset_agreed(&mut self) -> bool {
        if !self.agreed {
            return false;
        }
        self.agreed = false;
        true
    }

    /// Record an edit at `now` and restart the expiry window.
    ///
    /// `expire_time` is `now + PROPOSAL_LIFETIME`, except within one lifetime
    /// of the end of `u32` time, where it saturates at `u32::MAX`.
    pub fn update_time_data(&mut self, now: u32) {
        self.last_edited = now;
        self.expire_time = now.saturating_add(PROPOSAL_LIFETIME);
    }

    /// Drop funding inputs beyond `MAX_TX_INPUTS`, keeping the first ones in order
    pub fn remove_overflowed_proposal_tx_inputs(&mut self) {
        self.funding_tx.inputs.truncate(MAX_TX_INPUTS);
    }

    /// Clear every input's unlocking script
    pub fn clear_proposal_tx_input_script_sigs(&mut self) {
        for input in &mut self.funding_tx.inputs {
            input.script_sig.clear();
        }
    }

    fn write_fields(&self, bytes: &mut Vec<u8>, with_id: bool) {
        bytes.extend_from_slice(&self.version.to_le_bytes());
        if with_id {
            bytes.extend_from_slice(&self.hash_id.0);
        }
        bytes.extend_from_slice(&self.creation_time.to_le_bytes());
        bytes.extend_from_slice(&self.last_edited.to_le_bytes());
        bytes.extend_from_slice(&self.expire_time.to_le_bytes());
        write_var_bytes(bytes, self.headline.as_bytes());
        write_var_bytes(bytes, self.description.as_bytes());
        self.funding_tx.write_to(bytes);
    }

    /// Append the full canonical byte form (ID included, agreement excluded)
    pub fn write_to(&self, bytes: &mut Vec<u8>) {
        self.write_fields(bytes, true);
    }

    /// Serialize to the full canonical byte form
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes);
        bytes
    }

    /// Read the full canonical byte form. The agreement flag starts unset.
    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            version: reader.read_u32()?,
            hash_id: reader.read_hash()?,
            creation_time: reader.read_u32()?,
            last_edited: reader.read_u32()?,
            expire_time: reader.read_u32()?,
            headline: reader.read_string()?,
            description: reader.read_string()?,
            funding_tx: MutableTransaction::read_from(reader)?,
            agreed: false,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(bytes);
        let proposal = Self::read_from(&mut reader)?;
        reader.finish()?;
        Ok(proposal)
    }

    /// Content hash over every persisted field except `hash_id` itself
    pub fn hash(&self) -> Hash {
        let mut bytes = Vec::new();
        self.write_fields(&mut bytes, false);
        hash_bytes(&bytes)
    }

    pub fn summary(&self, now: u32) -> ProposalSummary {
        ProposalSummary {
            id: self.hash_id.to_hex(),
            bytes: self.to_bytes().len(),
            version: self.version,
            creation_time: self.creation_time,
            last_edited: self.last_edited,
            expire_time: self.expire_time,
            expired: self.is_expired(now),
            agreed: self.agreed,
            headline: self.headline.clone(),
            description: self.description.clone(),
            inputs: self.funding_tx.inputs.len(),
            outputs: self.funding_tx.outputs.len(),
        }
    }
}
