//! Treasury Core Library
//! 
//! Governance and versioning pieces of a merged-mining PoW node: the
//! bit-packed block version field, the treasury proposal mempool, and the
//! hard-fork activation gate.

pub mod config;
pub mod consensus;
pub mod crypto;
pub mod governance;
pub mod primitives;
pub mod storage;
pub mod treasury;

/// Protocol constants - HARD-CODED, NEVER CONFIGURABLE
pub mod constants {
    /// Maximum proposal headline length in bytes
    pub const MAX_HEADLINE_LENGTH: usize = 512;

    /// Maximum proposal description length in bytes
    pub const MAX_DESCRIPTION_LENGTH: usize = 32_768;

    /// Maximum number of inputs kept in a proposal funding transaction
    pub const MAX_TX_INPUTS: usize = 1200;

    /// Lifetime of a proposal after its last edit (31 days, in seconds)
    pub const PROPOSAL_LIFETIME: u32 = 60 * 60 * 24 * 31;

    /// A proposal may only be extended inside this window before expiry (7 days)
    pub const PROPOSAL_EXTEND_WINDOW: u32 = 60 * 60 * 24 * 7;

    /// Format version of newly created proposals
    pub const CURRENT_PROPOSAL_VERSION: u32 = 1;

    /// Format version of newly created treasury mempools (0 means "not cached")
    pub const CURRENT_MEMPOOL_VERSION: u32 = 1;

    /// Marker prefixed to every persisted treasury mempool
    pub const TREASURY_FILE_MARKER: &str = "GlobalTokenTreasuryProposalFileMagic";

    /// Scripts longer than this can never be spent
    pub const MAX_SCRIPT_SIZE: usize = 10_000;
}
