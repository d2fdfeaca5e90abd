//! # mn-status rpc-json
//!
//! Structs for the dashd JSON-RPC responses consumed by the masternode status
//! check. Fields that only some daemon versions report are `Option`s with
//! `#[serde(default)]` so one struct decodes both legacy and DIP3-era output.

pub extern crate dashcore;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use dashcore::Amount;

/// Models the result of "getgovernanceinfo"
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct GetGovernanceInfoResult {
    #[serde(rename = "governanceminquorum")]
    pub governance_min_quorum: u32,
    #[serde(rename = "proposalfee", with = "dashcore::amount::serde::as_btc")]
    pub proposal_fee: Amount,
    #[serde(rename = "superblockcycle")]
    pub superblock_cycle: u32,
    #[serde(rename = "lastsuperblock", default)]
    pub last_superblock: Option<u32>,
    #[serde(rename = "nextsuperblock", default)]
    pub next_superblock: Option<u32>,
    #[serde(rename = "masternodewatchdogmaxseconds", default)]
    pub masternode_watchdog_max_seconds: Option<u64>,
}

/// Models the result of "masternode status"
///
/// Legacy daemons identify the collateral through the `vin` text
/// (`CTxIn(COutPoint(<txid>, <n>), scriptSig=)`); DIP3-era daemons report
/// the structured `outpoint` (`<txid>-<n>`) instead.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct MasternodeStatus {
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub outpoint: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub pubkey: Option<String>,
    #[serde(rename = "proTxHash", default)]
    pub pro_tx_hash: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    pub status: String,
}

/// Models the result of "mnsync status"
///
/// `IsMasternodeListSynced`, `IsWinnersListSynced` and `IsFailed` were
/// retired from DIP3-era daemons.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct MnSyncStatus {
    #[serde(rename = "AssetID", default)]
    pub asset_id: Option<u32>,
    #[serde(rename = "AssetName", default)]
    pub asset_name: Option<String>,
    #[serde(rename = "AssetStartTime", default)]
    pub asset_start_time: Option<u64>,
    #[serde(rename = "Attempt", default)]
    pub attempt: Option<u32>,
    #[serde(rename = "IsBlockchainSynced")]
    pub is_blockchain_synced: bool,
    #[serde(rename = "IsMasternodeListSynced", default)]
    pub is_masternode_list_synced: Option<bool>,
    #[serde(rename = "IsWinnersListSynced", default)]
    pub is_winners_list_synced: Option<bool>,
    #[serde(rename = "IsSynced")]
    pub is_synced: bool,
    #[serde(rename = "IsFailed", default)]
    pub is_failed: Option<bool>,
}

/// Models the subset of "getblockchaininfo" used here
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct GetBlockchainInfoResult {
    /// Network name: `main`, `test`, `regtest` or `devnet-<name>`.
    pub chain: String,
    #[serde(default)]
    pub blocks: Option<u32>,
    #[serde(default)]
    pub headers: Option<u32>,
    #[serde(rename = "bestblockhash", default)]
    pub best_block_hash: Option<String>,
    #[serde(rename = "verificationprogress", default)]
    pub verification_progress: Option<f64>,
}

/// Models the result of "masternode count"
///
/// Legacy daemons answer `masternode count enabled` with a bare integer,
/// newer ones return an object with totals.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MasternodeCount {
    Legacy(u32),
    Detailed {
        total: u32,
        enabled: u32,
    },
}

impl MasternodeCount {
    /// Number of enabled masternodes.
    ///
    /// A bare integer is taken as the enabled count, which is what legacy
    /// daemons return for the `enabled` mode.
    pub fn enabled(&self) -> u32 {
        match self {
            MasternodeCount::Legacy(count) => *count,
            MasternodeCount::Detailed {
                enabled,
                ..
            } => *enabled,
        }
    }
}

/// Models the result of "masternodelist full", keyed by collateral outpoint.
///
/// Values are kept undecoded; legacy daemons return a whitespace separated
/// string per entry while newer ones may return objects.
pub type MasternodeListResult = Map<String, Value>;

/// Models the result of "gobject list", keyed by governance object hash.
pub type GObjectListResult = Map<String, Value>;

/// Models the result of the legacy "mnbudget show", keyed by proposal name.
pub type MnBudgetShowResult = Map<String, Value>;
