//! Block version field
//!
//! The 32-bit header version doubles as a merged-mining descriptor:
//!
//! ```text
//!  31            16 15        9 8  7         0
//! +----------------+-----------+--+-----------+
//! |   chain ID     |   base    |A |   base    |
//! +----------------+-----------+--+-----------+
//! ```
//!
//! Bit 8 (`A`) marks an auxpow block. The chain ID occupies everything from
//! bit 16 upwards and is read back by signed integer division, not by a
//! shift, so stray low bits and negative values behave exactly as the raw
//! integer arithmetic dictates. Other nodes depend on that arithmetic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Auxpow marker bit
pub const VERSION_AUXPOW: i32 = 1 << 8;

/// Bits at and above this value hold the auxpow chain ID
pub const VERSION_CHAIN_START: i32 = 1 << 16;

/// Versions that predate the multi-algo hard fork
pub const LEGACY_VERSIONS: [i32; 5] = [1, 2, 536_870_912, 536_870_913, 536_870_914];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("Base version can only be set before the auxpow flag")]
    AuxpowAlreadySet,
}

/// A block header version with auxpow and chain ID accessors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockVersion(pub i32);

impl BlockVersion {
    pub fn new(version: i32) -> Self {
        BlockVersion(version)
    }

    /// Raw version value as it appears on the wire
    pub fn value(&self) -> i32 {
        self.0
    }

    /// Extract the base version (without auxpow flag and chain ID)
    pub fn base_version(&self, chain_id: i32) -> i32 {
        Self::base_version_of(self.0, chain_id)
    }

    /// `base_version` on a raw value
    ///
    /// The auxpow bit is known to be set when it is cleared, and the chain ID
    /// region is disjoint from the base bits, so both are removed with XOR.
    pub fn base_version_of(version: i32, chain_id: i32) -> i32 {
        let mut version = version;
        if version & VERSION_AUXPOW != 0 {
            version ^= VERSION_AUXPOW;
        }
        version ^ chain_id.wrapping_mul(VERSION_CHAIN_START)
    }

    /// Set the base version and chain ID of a block that is not auxpow yet.
    pub fn set_base_version(&mut self, base_version: i32, chain_id: i32) -> Result<(), VersionError> {
        if self.is_auxpow() {
            return Err(VersionError::AuxpowAlreadySet);
        }
        self.0 = base_version | chain_id.wrapping_mul(VERSION_CHAIN_START);
        Ok(())
    }

    /// Chain ID, by truncating division
    pub fn chain_id(&self) -> i32 {
        self.0 / VERSION_CHAIN_START
    }

    pub fn set_chain_id(&mut self, chain_id: i32) {
        self.0 %= VERSION_CHAIN_START;
        self.0 |= chain_id.wrapping_mul(VERSION_CHAIN_START);
    }

    /// Check if the auxpow flag is set
    pub fn is_auxpow(&self) -> bool {
        self.0 & VERSION_AUXPOW != 0
    }

    pub fn set_auxpow(&mut self, auxpow: bool) {
        if auxpow {
            self.0 |= VERSION_AUXPOW;
        } else {
            self.0 &= !VERSION_AUXPOW;
        }
    }

    /// Version with the auxpow marker removed, used to check the mining
    /// algorithm independently of merge mining.
    pub fn auxpow_version(&self) -> i32 {
        self.0 & !VERSION_AUXPOW
    }

    /// Check if a raw version is one of the pre-fork legacy versions
    pub fn is_legacy_version(version: i32) -> bool {
        LEGACY_VERSIONS.contains(&version)
    }

    pub fn is_legacy(&self) -> bool {
        Self::is_legacy_version(self.0)
    }
}

impl From<i32> for BlockVersion {
    fn from(version: i32) -> Self {
        BlockVersion(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_roundtrip() {
        let mut version = BlockVersion::default();
        version.set_chain_id(0x10);
        version.set_base_version(4, 0x10).unwrap();
        version.set_auxpow(true);

        assert_eq!(version.value(), 0x0010_0104);
        assert_eq!(version.chain_id(), 0x10);
        assert_eq!(version.base_version(0x10), 4);
        assert!(version.is_auxpow());
    }

    #[test]
    fn test_set_base_version_rejected_after_auxpow() {
        let mut version = BlockVersion::new(VERSION_AUXPOW);
        assert_eq!(version.set_base_version(2, 1), Err(VersionError::AuxpowAlreadySet));
        assert_eq!(version.value(), VERSION_AUXPOW);
    }

    #[test]
    fn test_clear_auxpow_flag() {
        let mut version = BlockVersion::new(0x0001_0102);
        version.set_auxpow(false);
        assert!(!version.is_auxpow());
        assert_eq!(version.value(), 0x0001_0002);

        // Clearing twice is harmless
        version.set_auxpow(false);
        assert_eq!(version.value(), 0x0001_0002);
    }

    #[test]
    fn test_auxpow_version_strips_marker_only() {
        let version = BlockVersion::new(0x0004_0000 | (3 << 9) | VERSION_AUXPOW);
        assert_eq!(version.auxpow_version(), 0x0004_0000 | (3 << 9));
        assert_eq!(BlockVersion::new(3 << 9).auxpow_version(), 3 << 9);
    }

    #[test]
    fn test_set_chain_id_replaces_previous() {
        let mut version = BlockVersion::new(0x0007_0042);
        version.set_chain_id(0x21);
        assert_eq!(version.value(), 0x0021_0042);
        assert_eq!(version.chain_id(), 0x21);
    }

    #[test]
    fn test_legacy_versions() {
        for v in LEGACY_VERSIONS {
            assert!(BlockVersion::is_legacy_version(v));
        }
        for v in [0, 3, -1, 536_870_911, 536_870_915, i32::MAX, i32::MIN] {
            assert!(!BlockVersion::is_legacy_version(v));
        }
        assert!(BlockVersion::new(2).is_legacy());
    }

    // ========================================================================
    // Negative and extreme values
    // ========================================================================

    #[test]
    fn test_all_bits_set() {
        let version = BlockVersion::new(-1);
        assert!(version.is_auxpow());
        // -1 / 65536 truncates toward zero
        assert_eq!(version.chain_id(), 0);
        assert_eq!(version.auxpow_version(), -1 & !VERSION_AUXPOW);
        assert_eq!(version.base_version(0), -1 ^ VERSION_AUXPOW);
    }

    #[test]
    fn test_negative_chain_id_division() {
        // chain ID -1 with an empty base divides back exactly
        let version = BlockVersion::new(-VERSION_CHAIN_START);
        assert_eq!(version.chain_id(), -1);

        // a non-zero base pulls the quotient toward zero
        let version = BlockVersion::new(-VERSION_CHAIN_START | 4);
        assert_eq!(version.chain_id(), 0);
    }

    #[test]
    fn test_set_chain_id_on_negative_version() {
        // the remainder keeps the sign of the dividend: -5 % 65536 == -5
        let mut version = BlockVersion::new(-5);
        version.set_chain_id(1);
        assert_eq!(version.value(), -5 | VERSION_CHAIN_START);
        assert_eq!(version.value(), -5);
    }

    #[test]
    fn test_extreme_chain_ids_do_not_panic() {
        let mut version = BlockVersion::default();
        version.set_chain_id(i32::MAX);
        assert_eq!(version.value(), i32::MAX.wrapping_mul(VERSION_CHAIN_START));
        assert_eq!(version.value(), -VERSION_CHAIN_START);

        assert_eq!(BlockVersion::base_version_of(i32::MIN, i32::MIN), i32::MIN);
    }
}
