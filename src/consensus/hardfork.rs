//! Hard-fork activation gate

use serde::{Deserialize, Serialize};
use crate::crypto::Hash;

/// Identity and activation point of a scheduled hard fork
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardforkProperties {
    /// Hard-fork ID, 0 for "no hard fork"
    id: i32,
    /// Unix timestamp from which the fork rules apply
    activation_time: u32,
    /// Height at which the fork was first activated
    activation_height: i32,
    /// Hash of the block at `activation_height`
    activation_block_hash: Hash,
}

impl HardforkProperties {
    /// Create a gate that only knows its ID and activation time
    pub fn new(id: i32, activation_time: u32) -> Self {
        Self {
            id,
            activation_time,
            ..Self::default()
        }
    }

    pub fn initialize(&mut self, id: i32, activation_time: u32, height: i32, block_hash: Hash) {
        self.id = id;
        self.activation_time = activation_time;
        self.activation_height = height;
        self.activation_block_hash = block_hash;
    }

    pub fn set_null(&mut self) {
        *self = Self::default();
    }

    pub fn is_null(&self) -> bool {
        self.id == 0
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn activation_time(&self) -> u32 {
        self.activation_time
    }

    pub fn activation_height(&self) -> i32 {
        self.activation_height
    }

    pub fn activation_block_hash(&self) -> Hash {
        self.activation_block_hash
    }

    /// True from `activation_time` onwards (inclusive)
    pub fn is_activated(&self, time: u32) -> bool {
        time >= self.activation_time
    }

    /// Decimal rendering of the hard-fork ID
    pub fn hardfork_id_string(&self) -> String {
        self.id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash_bytes;

    #[test]
    fn test_activation_boundary() {
        let fork = HardforkProperties::new(3, 1_550_000_000);
        assert!(!fork.is_activated(1_549_999_999));
        assert!(fork.is_activated(1_550_000_000));
        assert!(fork.is_activated(u32::MAX));
    }

    #[test]
    fn test_zero_activation_time_is_always_active() {
        assert!(HardforkProperties::default().is_activated(0));
    }

    #[test]
    fn test_id_string() {
        assert_eq!(HardforkProperties::new(3, 0).hardfork_id_string(), "3");
        assert_eq!(HardforkProperties::new(-12, 0).hardfork_id_string(), "-12");
    }

    #[test]
    fn test_initialize_and_reset() {
        let mut fork = HardforkProperties::default();
        assert!(fork.is_null());

        let block_hash = hash_bytes(b"activation block");
        fork.initialize(2, 1_600_000_000, 450_000, block_hash);
        assert!(!fork.is_null());
        assert_eq!(fork.id(), 2);
        assert_eq!(fork.activation_time(), 1_600_000_000);
        assert_eq!(fork.activation_height(), 450_000);
        assert_eq!(fork.activation_block_hash(), block_hash);

        fork.set_null();
        assert!(fork.is_null());
        assert_eq!(fork, HardforkProperties::default());
    }
}
