//! Treasury mempool
//!
//! Holds the pending treasury proposals together with the redeem scripts
//! and change destination used to build payouts. The collection is swept
//! when a new block arrives and persisted by the storage layer as its
//! canonical bytes (`to_bytes` / `from_bytes`) followed by `hash()`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::constants::CURRENT_MEMPOOL_VERSION;
use crate::crypto::{Hash, hash_bytes};
use crate::primitives::{ByteReader, DecodeError, Script};
use super::TreasuryProposal;

/// Pending treasury proposals and scripts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryMempool {
    /// Format version, 0 while nothing is cached
    version: u32,
    /// Unix time of the last save
    last_saved: u32,
    /// Proposals in submission order
    pub proposals: Vec<TreasuryProposal>,
    /// Redeem scripts, duplicates tolerated
    pub redeem_scripts: Vec<Script>,
    /// Treasury change destination, empty when unset
    pub change_script: Script,
    /// Where the storage layer keeps this mempool
    #[serde(skip)]
    file_path: PathBuf,
}

/// JSON view of the mempool metadata
#[derive(Debug, Clone, Serialize)]
pub struct MempoolInfo {
    pub proposals: usize,
    pub scripts: usize,
    pub bytes: usize,
    pub version: u32,
    pub last_saved: u32,
    pub file_path: String,
}

impl TreasuryMempool {
    /// Create a null (not cached) mempool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cached mempool stored at `path`
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            version: CURRENT_MEMPOOL_VERSION,
            file_path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn set_null(&mut self) {
        *self = Self::default();
    }

    pub fn set_file_path<P: AsRef<Path>>(&mut self, path: P) {
        self.file_path = path.as_ref().to_path_buf();
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// A mempool is cached once it has a non-zero version
    pub fn is_cached(&self) -> bool {
        self.version != 0
    }

    pub fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    pub fn set_last_saved(&mut self, last_saved: u32) {
        self.last_saved = last_saved;
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn last_saved(&self) -> u32 {
        self.last_saved
    }

    /// Serialize to the canonical byte form
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.last_saved.to_le_bytes());

        bytes.extend_from_slice(&(self.proposals.len() as u32).to_le_bytes());
        for proposal in &self.proposals {
            proposal.write_to(&mut bytes);
        }

        bytes.extend_from_slice(&(self.redeem_scripts.len() as u32).to_le_bytes());
        for script in &self.redeem_scripts {
            script.write_to(&mut bytes);
        }

        self.change_script.write_to(&mut bytes);
        bytes
    }

    /// Decode the canonical byte form. The file path is left empty for the
    /// storage layer to fill in.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(bytes);
        let version = reader.read_u32()?;
        let last_saved = reader.read_u32()?;

        let mut proposals = Vec::new();
        for _ in 0..reader.read_count()? {
            proposals.push(TreasuryProposal::read_from(&mut reader)?);
        }

        let mut redeem_scripts = Vec::new();
        for _ in 0..reader.read_count()? {
            redeem_scripts.push(Script::read_from(&mut reader)?);
        }

        let change_script = Script::read_from(&mut reader)?;
        reader.finish()?;

        Ok(Self {
            version,
            last_saved,
            proposals,
            redeem_scripts,
            change_script,
            file_path: PathBuf::new(),
        })
    }

    /// Integrity checksum over all persisted fields
    pub fn hash(&self) -> Hash {
        hash_bytes(&self.to_bytes())
    }

    /// Remove every proposal expired at `time`, keeping survivors in order.
    /// Returns how many were removed.
    pub fn delete_expired_proposals(&mut self, time: u32) -> usize {
        let before = self.proposals.len();
        self.proposals.retain(|p| !p.is_expired(time));
        before - self.proposals.len()
    }

    /// Index of the first redeem script equal to `script`
    pub fn search_script_by_script(&self, script: &Script) -> Option<usize> {
        self.redeem_scripts.iter().position(|s| s == script)
    }

    /// Remove the redeem script at `index`, `false` if out of range
    pub fn remove_script_by_id(&mut self, index: usize) -> bool {
        if index >= self.redeem_scripts.len() {
            return false;
        }
        self.redeem_scripts.remove(index);
        true
    }

    /// Index of the first proposal whose ID is `hash`
    pub fn get_proposal_by_id(&self, hash: &Hash) -> Option<usize> {
        self.proposals.iter().position(|p| p.hash_id == *hash)
    }

    pub fn info(&self) -> MempoolInfo {
        MempoolInfo {
            proposals: self.proposals.len(),
            scripts: self.redeem_scripts.len(),
            bytes: self.to_bytes().len(),
            version: self.version,
            last_saved: self.last_saved,
            file_path: self.file_path.display().to_string(),
        }
    }
}
