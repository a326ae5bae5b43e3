//! Treasury persistence using Sled
//!
//! Saves and loads the treasury mempool. The stored record is the file
//! marker, the mempool's canonical bytes, then the 32-byte BLAKE3 hash of
//! exactly those bytes.

use log::{info, warn};
use sled::{Db, Tree};
use std::path::{Path, PathBuf};
use thiserror::Error;
use crate::constants::TREASURY_FILE_MARKER;
use crate::crypto::{Hash, hash_bytes};
use crate::primitives::DecodeError;
use crate::treasury::TreasuryMempool;

const MEMPOOL_KEY: &str = "mempool";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
    #[error("Decoding error: {0}")]
    Decode(#[from] DecodeError),
    #[error("Treasury record does not start with the file marker")]
    MissingMarker,
    #[error("Treasury record is truncated")]
    Truncated,
    #[error("Treasury checksum mismatch: stored {expected}, computed {actual}")]
    IntegrityMismatch { expected: Hash, actual: Hash },
}

impl StorageError {
    /// Errors caused by bad stored content rather than the database itself
    pub fn is_corruption(&self) -> bool {
        !matches!(self, StorageError::Database(_))
    }
}

/// Database wrapper for the treasury mempool
#[derive(Debug, Clone)]
pub struct TreasuryStore {
    db: Db,
    treasury_tree: Tree,
    path: PathBuf,
}

impl TreasuryStore {
    /// Open or create the database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path.as_ref())?;
        Self::from_db(db, path.as_ref())
    }

    /// Wrap an already opened database
    pub fn from_db<P: AsRef<Path>>(db: Db, path: P) -> Result<Self, StorageError> {
        let treasury_tree = db.open_tree("treasury")?;
        Ok(Self {
            db,
            treasury_tree,
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the mempool and stamp `last_saved`. The stamp is only applied
    /// once the record reached disk.
    pub fn save(&self, mempool: &mut TreasuryMempool, now: u32) -> Result<(), StorageError> {
        let record = encode_record(mempool, now);
        self.treasury_tree.insert(MEMPOOL_KEY, record)?;
        self.db.flush()?;

        mempool.set_last_saved(now);
        info!("Saved treasury mempool ({} proposals) to {}", mempool.proposals.len(), self.path.display());
        Ok(())
    }

    /// Load the stored mempool, `None` if nothing was saved yet
    pub fn load(&self) -> Result<Option<TreasuryMempool>, StorageError> {
        let record = match self.treasury_tree.get(MEMPOOL_KEY)? {
            Some(record) => record,
            None => return Ok(None),
        };

        let body = record
            .strip_prefix(TREASURY_FILE_MARKER.as_bytes())
            .ok_or(StorageError::MissingMarker)?;
        if body.len() < 32 {
            return Err(StorageError::Truncated);
        }

        let (encoded, trailer) = body.split_at(body.len() - 32);
        let expected = Hash::from_slice(trailer).ok_or(StorageError::Truncated)?;
        let actual = hash_bytes(encoded);
        if actual != expected {
            return Err(StorageError::IntegrityMismatch { expected, actual });
        }

        let mut mempool = TreasuryMempool::from_bytes(encoded)?;
        mempool.set_file_path(&self.path);
        Ok(Some(mempool))
    }

    /// Load the stored mempool, falling back to a fresh one when nothing
    /// usable is stored. Database failures are still reported.
    pub fn load_or_empty(&self) -> Result<TreasuryMempool, StorageError> {
        match self.load() {
            Ok(Some(mempool)) => Ok(mempool),
            Ok(None) => Ok(TreasuryMempool::with_path(&self.path)),
            Err(e) if e.is_corruption() => {
                warn!("Rejecting treasury mempool at {}: {}", self.path.display(), e);
                Ok(TreasuryMempool::with_path(&self.path))
            }
            Err(e) => Err(e),
        }
    }
}

/// Marker, canonical bytes of `mempool` as saved at `now`, trailing hash
fn encode_record(mempool: &TreasuryMempool, now: u32) -> Vec<u8> {
    let mut stamped = mempool.clone();
    stamped.set_last_saved(now);
    let encoded = stamped.to_bytes();

    let mut record = Vec::with_capacity(TREASURY_FILE_MARKER.len() + encoded.len() + 32);
    record.extend_from_slice(TREASURY_FILE_MARKER.as_bytes());
    record.extend_from_slice(&encoded);
    record.extend_from_slice(&hash_bytes(&encoded).0);
    record
}
