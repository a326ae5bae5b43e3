//! Treasury node
//!
//! Opens the treasury mempool, sweeps proposals that expired while the node
//! was down, reports the mempool state and saves it back.
//!
//! Usage: `treasury-node [config.toml]`

use log::{info, warn};
use std::time::{SystemTime, UNIX_EPOCH};
use treasury_core::config::Config;
use treasury_core::consensus::{coinbase_fee_message, WarningKind};
use treasury_core::governance::TreasuryGovernance;
use treasury_core::storage::TreasuryStore;

fn unix_now() -> u32 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => {
            warn!("No config file given, using defaults");
            Config::default()
        }
    };

    let now = unix_now();
    let store = TreasuryStore::open(&config.treasury.path)?;
    let governance = TreasuryGovernance::new(store.load_or_empty()?);

    if config.treasury.sweep_on_start {
        governance.sweep_expired(now)?;
    }

    let mempool_info = governance.info()?;
    println!("{}", serde_json::to_string_pretty(&mempool_info)?);
    for summary in governance.proposal_summaries(now)? {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    let hardfork = config.hardfork.properties();
    if !hardfork.is_null() && hardfork.is_activated(now) {
        info!("Hardfork {} is active", hardfork.hardfork_id_string());
        println!("{}", coinbase_fee_message(WarningKind::Generate, &config.networks));
    }

    let mut mempool = governance.close()?;
    store.save(&mut mempool, now)?;
    Ok(())
}
