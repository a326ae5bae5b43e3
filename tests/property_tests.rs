//! Property-based and scenario tests for the treasury core
//!
//! These tests verify invariants hold under random inputs.

use proptest::prelude::*;
use treasury_core::constants::{MAX_TX_INPUTS, PROPOSAL_LIFETIME};
use treasury_core::consensus::{BlockVersion, LEGACY_VERSIONS, VERSION_AUXPOW};
use treasury_core::crypto::{hash_bytes, Hash};
use treasury_core::governance::TreasuryGovernance;
use treasury_core::primitives::{MutableTransaction, OutPoint, Script, TxIn, TxOut};
use treasury_core::storage::TreasuryStore;
use treasury_core::treasury::{TreasuryMempool, TreasuryProposal};

fn proposal_expiring_at(index: usize, expire_time: u32) -> TreasuryProposal {
    let mut p = TreasuryProposal::new();
    p.headline = format!("proposal {}", index);
    p.expire_time = expire_time;
    p.hash_id = p.hash();
    p
}

/// Base versions fit in the low 16 bits and never use the auxpow bit
fn base_version() -> impl Strategy<Value = i32> {
    (0i32..0x1_0000).prop_map(|b| b & !VERSION_AUXPOW)
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

proptest! {
    /// Chain ID, base version and auxpow flag round-trip exactly
    #[test]
    fn prop_version_fields_roundtrip(
        base in base_version(),
        chain_id in 0i32..0x8000,
        auxpow in any::<bool>()
    ) {
        let mut version = BlockVersion::default();
        version.set_chain_id(chain_id);
        prop_assert!(version.set_base_version(base, chain_id).is_ok());
        version.set_auxpow(auxpow);

        prop_assert_eq!(version.chain_id(), chain_id);
        prop_assert_eq!(version.base_version(chain_id), base);
        prop_assert_eq!(version.is_auxpow(), auxpow);
    }

    /// Clearing the marker never touches any other bit
    #[test]
    fn prop_auxpow_version_only_clears_marker(raw in any::<i32>()) {
        let version = BlockVersion::new(raw);
        prop_assert_eq!(version.auxpow_version() | (raw & VERSION_AUXPOW), raw);
        prop_assert!(!BlockVersion::new(version.auxpow_version()).is_auxpow());
    }

    /// Chain ID extraction is signed truncating division for every input
    #[test]
    fn prop_chain_id_is_division(raw in any::<i32>()) {
        prop_assert_eq!(BlockVersion::new(raw).chain_id(), raw / 65536);
    }

    /// Only the five legacy values are legacy
    #[test]
    fn prop_legacy_membership(raw in any::<i32>()) {
        prop_assert_eq!(BlockVersion::is_legacy_version(raw), LEGACY_VERSIONS.contains(&raw));
    }

    /// The sweep removes exactly the expired proposals and keeps order
    #[test]
    fn prop_sweep_removes_exactly_expired(
        expiries in prop::collection::vec(0u32..1_000, 0..40),
        now in 0u32..1_000
    ) {
        let mut mempool = TreasuryMempool::with_path("prop");
        mempool.proposals = expiries
            .iter()
            .enumerate()
            .map(|(i, &t)| proposal_expiring_at(i, t))
            .collect();

        let expected: Vec<String> = mempool.proposals
            .iter()
            .filter(|p| p.expire_time > now)
            .map(|p| p.headline.clone())
            .collect();

        let removed = mempool.delete_expired_proposals(now);

        let survivors: Vec<String> = mempool.proposals.iter().map(|p| p.headline.clone()).collect();
        prop_assert_eq!(removed, expiries.len() - expected.len());
        prop_assert_eq!(survivors, expected);
    }

    /// Expiry is inclusive at exactly `last_edited + PROPOSAL_LIFETIME`
    #[test]
    fn prop_expiry_boundary(now in 0u32..(u32::MAX - PROPOSAL_LIFETIME)) {
        let mut proposal = TreasuryProposal::new();
        proposal.update_time_data(now);

        prop_assert_eq!(proposal.expire_time, now + PROPOSAL_LIFETIME);
        prop_assert!(!proposal.is_expired(now + PROPOSAL_LIFETIME - 1));
        prop_assert!(proposal.is_expired(now + PROPOSAL_LIFETIME));
    }

    /// Trimming keeps min(n, MAX_TX_INPUTS) inputs, prefix in order
    #[test]
    fn prop_input_trim_keeps_prefix(extra in 0usize..20, short in any::<bool>()) {
        let count = if short { extra } else { MAX_TX_INPUTS + extra };
        let inputs: Vec<TxIn> = (0..count as u32)
            .map(|n| TxIn::new(OutPoint::new(Hash::zero(), n)))
            .collect();

        let mut proposal = TreasuryProposal::new();
        proposal.funding_tx = MutableTransaction::new(inputs.clone(), vec![]);
        proposal.remove_overflowed_proposal_tx_inputs();

        let kept = count.min(MAX_TX_INPUTS);
        prop_assert_eq!(proposal.funding_tx.inputs.len(), kept);
        prop_assert_eq!(&proposal.funding_tx.inputs[..], &inputs[..kept]);
    }
}

// ============================================================================
// SCENARIO TESTS
// ============================================================================

/// Test: Proposal lifecycle through the command surface
///
/// Submit, agree, let it age, extend, and finally let the block sweep drop it.
#[test]
fn test_proposal_lifecycle() {
    let start = 1_700_000_000u32;
    let governance = TreasuryGovernance::new(TreasuryMempool::with_path("lifecycle"));

    let id = governance.submit("Marketing budget", "Q3 campaign", start).unwrap();
    governance.agree(&id, start + 60).unwrap();

    let proposal = governance.proposal(&id).unwrap();
    assert!(proposal.is_agreed());
    assert_eq!(proposal.expire_time, start + 60 + PROPOSAL_LIFETIME);

    // six days before expiry the owner extends it
    let late = proposal.expire_time - 6 * 24 * 60 * 60;
    governance.extend(&id, late).unwrap();
    let extended = governance.proposal(&id).unwrap();
    assert_eq!(extended.expire_time, late + PROPOSAL_LIFETIME);

    // a block arrives one second before the new expiry, then exactly at it
    assert_eq!(governance.sweep_expired(extended.expire_time - 1).unwrap(), 0);
    assert_eq!(governance.sweep_expired(extended.expire_time).unwrap(), 1);
    assert!(governance.proposals().unwrap().is_empty());
}

/// Test: Integrity hash follows every mutation and nothing else
#[test]
fn test_mempool_hash_tracks_mutations() {
    let governance = TreasuryGovernance::new(TreasuryMempool::with_path("hash"));
    let initial = governance.hash().unwrap();
    assert_eq!(governance.hash().unwrap(), initial);

    let id = governance.submit("Bridge audit", "", 1_000).unwrap();
    let after_submit = governance.hash().unwrap();
    assert_ne!(after_submit, initial);

    // reading does not change it
    governance.proposal(&id).unwrap();
    governance.info().unwrap();
    assert_eq!(governance.hash().unwrap(), after_submit);

    governance.add_script(Script::new(vec![0x52, 0xae])).unwrap();
    let after_script = governance.hash().unwrap();
    assert_ne!(after_script, after_submit);

    governance.remove_script(0).unwrap();
    assert_eq!(governance.hash().unwrap(), after_submit);
}

/// Test: Two independent mempools never see each other's proposals
#[test]
fn test_lookup_is_per_instance() {
    let a = TreasuryGovernance::new(TreasuryMempool::with_path("a"));
    let b = TreasuryGovernance::new(TreasuryMempool::with_path("b"));

    let id = a.submit("Only in a", "", 5).unwrap();
    assert!(a.proposal(&id).is_ok());
    assert!(b.proposal(&id).is_err());
}

/// Test: Content hash identity ignores the stored ID
#[test]
fn test_proposal_id_is_content_hash() {
    let mut proposal = TreasuryProposal::new();
    proposal.headline = "Node hosting".to_string();
    proposal.update_time_data(42);

    let id = proposal.hash();
    proposal.hash_id = id;
    assert_eq!(proposal.hash(), id);
    assert_ne!(id, hash_bytes(&proposal.to_bytes()));
}

/// Test: A saved mempool reloads with identical canonical bytes
#[test]
fn test_store_round_trip_is_byte_exact() {
    let db = sled::Config::new().temporary(true).open().unwrap();
    let store = TreasuryStore::from_db(db, "round-trip").unwrap();
    let governance = TreasuryGovernance::new(TreasuryMempool::with_path("round-trip"));

    let id = governance.submit("Pool listing", "Listing fee for two pools", 2_000).unwrap();
    let mut funding = MutableTransaction::new(
        vec![TxIn::new(OutPoint::new(hash_bytes(b"treasury utxo"), 3))],
        vec![TxOut { value: 5_000_000_000, script_pubkey: Script::new(vec![0x76, 0xa9]) }],
    );
    funding.inputs[0].script_sig = Script::new(vec![0x00, 0x47]);
    governance.update_transaction(&id, funding, 2_100).unwrap();
    governance.add_script(Script::new(vec![0x52, 0xae])).unwrap();
    governance.agree(&id, 2_200).unwrap();

    let mut mempool = governance.close().unwrap();
    store.save(&mut mempool, 3_000).unwrap();
    let loaded = store.load().unwrap().unwrap();

    assert_eq!(loaded.to_bytes(), mempool.to_bytes());
    assert_eq!(loaded.hash(), mempool.hash());
    assert_eq!(loaded.last_saved(), 3_000);
    assert!(!loaded.proposals[0].is_agreed());
}
