//! Treasury governance commands
//!
//! The node shares one treasury mempool between mining, validation and the
//! operator. All access goes through this wrapper so that mutations are
//! serialized against each other and against readers. Every command takes
//! the caller's current time; nothing here reads a clock.

use log::{debug, info};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use crate::constants::{CURRENT_PROPOSAL_VERSION, MAX_DESCRIPTION_LENGTH, MAX_HEADLINE_LENGTH, PROPOSAL_EXTEND_WINDOW};
use crate::crypto::Hash;
use crate::primitives::{MutableTransaction, Script};
use crate::treasury::{MempoolInfo, ProposalSummary, TreasuryMempool, TreasuryProposal};

/// Governance command errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("No treasury mempool loaded")]
    NotLoaded,
    #[error("A treasury mempool is already loaded")]
    AlreadyLoaded,
    #[error("Treasury proposal not found: {0}")]
    ProposalNotFound(Hash),
    #[error("Headline exceeds max length of {max} with {0} bytes", max = MAX_HEADLINE_LENGTH)]
    HeadlineTooLong(usize),
    #[error("Description exceeds max length of {max} with {0} bytes", max = MAX_DESCRIPTION_LENGTH)]
    DescriptionTooLong(usize),
    #[error("Treasury proposal already exists: {0}")]
    DuplicateProposal(Hash),
    #[error("Treasury proposal already agreed")]
    AlreadyAgreed,
    #[error("Treasury proposal not agreed")]
    NotAgreed,
    #[error("Proposal is not about to expire")]
    NotAboutToExpire,
    #[error("Proposal transaction is unchanged")]
    TransactionUnchanged,
    #[error("Empty scripts cannot be added")]
    EmptyScript,
    #[error("The treasury script is unspendable")]
    UnspendableScript,
    #[error("Treasury script already exists with ID {0}")]
    DuplicateScript(usize),
    #[error("Treasury script ID {0} out of range")]
    ScriptNotFound(usize),
    #[error("A treasury change script is already configured")]
    ChangeScriptAlreadySet,
    #[error("No treasury change script configured")]
    NoChangeScript,
    #[error("Treasury mempool lock poisoned")]
    LockPoisoned,
}

pub type GovernanceResult<T> = Result<T, GovernanceError>;

/// Lock-guarded treasury mempool with the governance command set
#[derive(Debug, Default)]
pub struct TreasuryGovernance {
    mempool: RwLock<TreasuryMempool>,
}

impl TreasuryGovernance {
    /// Wrap an existing mempool (cached or not)
    pub fn new(mempool: TreasuryMempool) -> Self {
        Self {
            mempool: RwLock::new(mempool),
        }
    }

    fn read(&self) -> GovernanceResult<RwLockReadGuard<'_, TreasuryMempool>> {
        let guard = self.mempool.read().map_err(|_| GovernanceError::LockPoisoned)?;
        if !guard.is_cached() {
            return Err(GovernanceError::NotLoaded);
        }
        Ok(guard)
    }

    fn write(&self) -> GovernanceResult<RwLockWriteGuard<'_, TreasuryMempool>> {
        let guard = self.mempool.write().map_err(|_| GovernanceError::LockPoisoned)?;
        if !guard.is_cached() {
            return Err(GovernanceError::NotLoaded);
        }
        Ok(guard)
    }

    /// Run `f` on the proposal with ID `id`
    fn with_proposal<T>(
        &self,
        id: &Hash,
        f: impl FnOnce(&mut TreasuryProposal) -> GovernanceResult<T>,
    ) -> GovernanceResult<T> {
        let mut mempool = self.write()?;
        let index = mempool
            .get_proposal_by_id(id)
            .ok_or(GovernanceError::ProposalNotFound(*id))?;
        f(&mut mempool.proposals[index])
    }

    // ------------------------------------------------------------------
    // Mempool lifecycle
    // ------------------------------------------------------------------

    pub fn is_loaded(&self) -> bool {
        self.mempool.read().map(|m| m.is_cached()).unwrap_or(false)
    }

    /// Install a loaded mempool
    pub fn open(&self, mempool: TreasuryMempool) -> GovernanceResult<()> {
        let mut guard = self.mempool.write().map_err(|_| GovernanceError::LockPoisoned)?;
        if guard.is_cached() {
            return Err(GovernanceError::AlreadyLoaded);
        }
        info!("Opened treasury mempool at {} ({} proposals)", mempool.file_path().display(), mempool.proposals.len());
        *guard = mempool;
        Ok(())
    }

    /// Take the mempool out for saving, leaving a null one behind
    pub fn close(&self) -> GovernanceResult<TreasuryMempool> {
        let mut guard = self.write()?;
        Ok(std::mem::take(&mut *guard))
    }

    /// Discard the mempool without saving
    pub fn abort(&self) -> GovernanceResult<()> {
        self.write()?.set_null();
        Ok(())
    }

    /// Copy of the current mempool, e.g. for persistence
    pub fn snapshot(&self) -> GovernanceResult<TreasuryMempool> {
        Ok(self.read()?.clone())
    }

    pub fn info(&self) -> GovernanceResult<MempoolInfo> {
        Ok(self.read()?.info())
    }

    /// Integrity hash of the current mempool
    pub fn hash(&self) -> GovernanceResult<Hash> {
        Ok(self.read()?.hash())
    }

    // ------------------------------------------------------------------
    // Proposals
    // ------------------------------------------------------------------

    /// Create a proposal and return its ID
    pub fn submit(&self, headline: &str, description: &str, now: u32) -> GovernanceResult<Hash> {
        let mut proposal = TreasuryProposal::new();
        proposal.version = CURRENT_PROPOSAL_VERSION;
        proposal.creation_time = now;
        proposal.headline = headline.to_string();
        proposal.description = description.to_string();
        proposal.update_time_data(now);

        if !proposal.is_headline_valid() {
            return Err(GovernanceError::HeadlineTooLong(proposal.headline.len()));
        }
        if !proposal.is_description_valid() {
            return Err(GovernanceError::DescriptionTooLong(proposal.description.len()));
        }

        proposal.hash_id = proposal.hash();
        let id = proposal.hash_id;

        let mut mempool = self.write()?;
        if mempool.get_proposal_by_id(&id).is_some() {
            return Err(GovernanceError::DuplicateProposal(id));
        }
        mempool.proposals.push(proposal);
        info!("Treasury proposal {} submitted", id);
        Ok(id)
    }

    /// Replace the funding transaction of a proposal
    pub fn update_transaction(&self, id: &Hash, tx: MutableTransaction, now: u32) -> GovernanceResult<()> {
        self.with_proposal(id, |proposal| {
            if proposal.funding_tx.hash() == tx.hash() {
                return Err(GovernanceError::TransactionUnchanged);
            }
            proposal.funding_tx = tx;
            proposal.remove_overflowed_proposal_tx_inputs();
            proposal.update_time_data(now);
            Ok(())
        })
    }

    pub fn agree(&self, id: &Hash, now: u32) -> GovernanceResult<()> {
        self.with_proposal(id, |proposal| {
            if !proposal.set_agreed() {
                return Err(GovernanceError::AlreadyAgreed);
            }
            proposal.update_time_data(now);
            Ok(())
        })
    }

    pub fn unagree(&self, id: &Hash, now: u32) -> GovernanceResult<()> {
        self.with_proposal(id, |proposal| {
            if !proposal.unset_agreed() {
                return Err(GovernanceError::NotAgreed);
            }
            proposal.update_time_data(now);
            Ok(())
        })
    }

    /// Restart the expiry window of a proposal that expires within a week
    pub fn extend(&self, id: &Hash, now: u32) -> GovernanceResult<()> {
        self.with_proposal(id, |proposal| {
            let remaining = i64::from(proposal.expire_time) - i64::from(now);
            if remaining >= i64::from(PROPOSAL_EXTEND_WINDOW) {
                return Err(GovernanceError::NotAboutToExpire);
            }
            proposal.update_time_data(now);
            Ok(())
        })
    }

    /// Force-expire a proposal and sweep it out
    pub fn delete(&self, id: &Hash, now: u32) -> GovernanceResult<()> {
        let mut mempool = self.write()?;
        let index = mempool
            .get_proposal_by_id(id)
            .ok_or(GovernanceError::ProposalNotFound(*id))?;
        // expire_time of 0 is expired at any time, including now == 0
        mempool.proposals[index].expire_time = now.saturating_sub(1);
        let removed = mempool.delete_expired_proposals(now);
        info!("Treasury proposal {} deleted ({} proposals swept)", id, removed);
        Ok(())
    }

    /// Remove all proposals expired at `now`
    pub fn sweep_expired(&self, now: u32) -> GovernanceResult<usize> {
        let removed = self.write()?.delete_expired_proposals(now);
        if removed > 0 {
            info!("Swept {} expired treasury proposals", removed);
        } else {
            debug!("No expired treasury proposals at {}", now);
        }
        Ok(removed)
    }

    pub fn proposal(&self, id: &Hash) -> GovernanceResult<TreasuryProposal> {
        let mempool = self.read()?;
        mempool
            .get_proposal_by_id(id)
            .map(|index| mempool.proposals[index].clone())
            .ok_or(GovernanceError::ProposalNotFound(*id))
    }

    pub fn proposals(&self) -> GovernanceResult<Vec<TreasuryProposal>> {
        Ok(self.read()?.proposals.clone())
    }

    pub fn proposal_summaries(&self, now: u32) -> GovernanceResult<Vec<ProposalSummary>> {
        Ok(self.read()?.proposals.iter().map(|p| p.summary(now)).collect())
    }

    pub fn clear_proposals(&self) -> GovernanceResult<()> {
        self.write()?.proposals.clear();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scripts
    // ------------------------------------------------------------------

    /// Add a redeem script and return its ID
    pub fn add_script(&self, script: Script) -> GovernanceResult<usize> {
        if script.is_empty() {
            return Err(GovernanceError::EmptyScript);
        }
        if script.is_unspendable() {
            return Err(GovernanceError::UnspendableScript);
        }

        let mut mempool = self.write()?;
        if let Some(index) = mempool.search_script_by_script(&script) {
            return Err(GovernanceError::DuplicateScript(index));
        }
        mempool.redeem_scripts.push(script);
        Ok(mempool.redeem_scripts.len() - 1)
    }

    pub fn script(&self, index: usize) -> GovernanceResult<Script> {
        self.read()?
            .redeem_scripts
            .get(index)
            .cloned()
            .ok_or(GovernanceError::ScriptNotFound(index))
    }

    pub fn scripts(&self) -> GovernanceResult<Vec<Script>> {
        Ok(self.read()?.redeem_scripts.clone())
    }

    pub fn remove_script(&self, index: usize) -> GovernanceResult<()> {
        if !self.write()?.remove_script_by_id(index) {
            return Err(GovernanceError::ScriptNotFound(index));
        }
        Ok(())
    }

    pub fn clear_scripts(&self) -> GovernanceResult<()> {
        self.write()?.redeem_scripts.clear();
        Ok(())
    }

    pub fn set_change_script(&self, script: Script) -> GovernanceResult<()> {
        let mut mempool = self.write()?;
        if !mempool.change_script.is_empty() {
            return Err(GovernanceError::ChangeScriptAlreadySet);
        }
        if script.is_empty() {
            return Err(GovernanceError::EmptyScript);
        }
        mempool.change_script = script;
        Ok(())
    }

    pub fn change_script(&self) -> GovernanceResult<Script> {
        let mempool = self.read()?;
        if mempool.change_script.is_empty() {
            return Err(GovernanceError::NoChangeScript);
        }
        Ok(mempool.change_script.clone())
    }

    pub fn clear_change_script(&self) -> GovernanceResult<()> {
        let mut mempool = self.write()?;
        if mempool.change_script.is_empty() {
            return Err(GovernanceError::NoChangeScript);
        }
        mempool.change_script.clear();
        Ok(())
    }
}
