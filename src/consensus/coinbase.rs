//! Divided coinbase policy text
//!
//! After the treasury hard fork every block pays a fixed percentage of its
//! reward to the treasury and to the masternode payee. The percentages are
//! per network and come from the chain parameters; this module only turns
//! them into the operator-facing notices.

use serde::{Deserialize, Serialize};

/// Reward percentages of one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkShares {
    /// Network name (main, test, regtest, ...)
    pub network: String,
    /// Percent of the block reward paid to the treasury
    pub treasury_percent: u32,
    /// Percent of the block reward paid to the masternode payee
    pub masternode_percent: u32,
}

impl NetworkShares {
    pub fn new(network: impl Into<String>, treasury_percent: u32, masternode_percent: u32) -> Self {
        Self {
            network: network.into(),
            treasury_percent,
            masternode_percent,
        }
    }

    /// Percent left for the miner. Negative when the table is misconfigured.
    pub fn miner_percent(&self) -> i64 {
        100 - i64::from(self.treasury_percent) - i64::from(self.masternode_percent)
    }
}

/// Where the notice is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A block was submitted without the divided coinbase
    Block,
    /// Built-in generation was requested
    Generate,
    /// `getblocktemplate` was requested by an external miner
    BlockTemplate,
    /// An auxpow block was requested
    Auxpow,
}

const AGREEMENT: &str = "\nAgreement:\n\n\
You can agree to pay the fees in one of these ways:\n\
\n- Always start the wallet with the -acceptdividedcoinbase argument\n\
- Add acceptdividedcoinbase=1 to your configuration file and restart the wallet.\n";

const NOT_AGREED: &str = "You are not able to mine new coins right now.\n\
\nSince the hardfork is active, you must pay the Treasury-Reward and the Masternode-Reward.\n\
\nYou did not agree to pay them yet, but it is required to mine new coins.\n\
\nThe payment amounts for each network are:\n\n";

/// One table row per network
fn write_share_rows(out: &mut String, networks: &[NetworkShares]) {
    let width = networks.iter().map(|n| n.network.len()).max().unwrap_or(0);
    for shares in networks {
        out.push_str(&format!(
            "Network: {:<width$} | Treasury-Reward: {}% of blockreward. | Masternode-Reward: {}% of blockreward. | Your mining Reward: {}% of blockreward.\n",
            shares.network,
            shares.treasury_percent,
            shares.masternode_percent,
            shares.miner_percent(),
            width = width,
        ));
    }
}

const TEMPLATE_DETAILS: &str = "You need to pay the treasury reward by adding the treasury output to your coinbase transaction.\n\
The 'treasury' object of the getblocktemplate result holds the 'scriptPubKey' and 'amount' to pay.\n\
The 'masternode' object holds the 'script' and 'amount' of the masternode payee.\n\
Deduct both amounts from the raw coinbase value (coinbasevalue - treasuryamount - masternodeamount = your block reward).\n\
The amounts and scripts change every block, so always use the current getblocktemplate output!\n";

const GENERATE_DETAILS: &str = "Your found blocks will automatically pay the fees, there are no additional steps for you.\n";

const AUXPOW_DETAILS: &str = "Your found auxpow blocks will automatically pay the fees, there are no additional steps for you.\n";

/// Render the divided-coinbase notice for `kind`
pub fn coinbase_fee_message(kind: WarningKind, networks: &[NetworkShares]) -> String {
    match kind {
        WarningKind::Block => block_warning(networks),
        WarningKind::Generate => not_agreed_notice(networks, GENERATE_DETAILS),
        WarningKind::Auxpow => not_agreed_notice(networks, AUXPOW_DETAILS),
        WarningKind::BlockTemplate => not_agreed_notice(networks, TEMPLATE_DETAILS),
    }
}

/// Shown when a submitted block lacks the divided coinbase
fn block_warning(networks: &[NetworkShares]) -> String {
    let mut out = String::new();
    out.push_str("Warning (Divided Coinbase): You tried to mine a block, but did not agree to pay the coinbase fees.\n");
    out.push_str("It is required to pay the following fees from the coinbase:\n\n");
    write_share_rows(&mut out, networks);
    out.push_str("\nThe fees will be deducted automatically from your mined block, if you mine directly in your wallet.\n");
    out.push_str("\nTo agree, you must start the wallet with the -acceptdividedcoinbase argument or add acceptdividedcoinbase=1 to your configuration file.\n");
    out
}

fn not_agreed_notice(networks: &[NetworkShares], details: &str) -> String {
    let mut out = String::from(NOT_AGREED);
    write_share_rows(&mut out, networks);
    out.push_str("\nDetails:\n\n");
    out.push_str(details);
    out.push_str(AGREEMENT);
    out.push_str("\nIf you don't agree to pay the fees, you will not be able to mine and your blocks will be rejected.\n");
    out
}
