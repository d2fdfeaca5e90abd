//! The masternode list, keyed by collateral outpoint.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use mn_status_rpc::RpcApi;
use mn_status_rpc::json::MasternodeListResult;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::vin::{Vin, VinParseError, parse_outpoint};

/// Field names of the pre-DIP3 `masternodelist full` row.
const LEGACY_FIELDS: [&str; 7] =
    ["protocol", "payee", "lastseen", "activeseconds", "lastpaidtime", "lastpaidblock", "addr"];

/// Field names of the DIP3-era `masternodelist full` row.
const DIP3_FIELDS: [&str; 4] = ["payee", "lastpaidtime", "lastpaidblock", "addr"];

/// Position of a masternode in the payment queue, as dashd spells it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueueStatus {
    PreEnabled,
    Enabled,
    Expired,
    Removed,
    VinSpent,
    OutpointSpent,
    UpdateRequired,
    WatchdogExpired,
    NewStartRequired,
    SentinelPingExpired,
    PoseBan,
    PoseBanned,
    Other(String),
}

impl QueueStatus {
    pub fn as_str(&self) -> &str {
        match self {
            QueueStatus::PreEnabled => "PRE_ENABLED",
            QueueStatus::Enabled => "ENABLED",
            QueueStatus::Expired => "EXPIRED",
            QueueStatus::Removed => "REMOVED",
            QueueStatus::VinSpent => "VIN_SPENT",
            QueueStatus::OutpointSpent => "OUTPOINT_SPENT",
            QueueStatus::UpdateRequired => "UPDATE_REQUIRED",
            QueueStatus::WatchdogExpired => "WATCHDOG_EXPIRED",
            QueueStatus::NewStartRequired => "NEW_START_REQUIRED",
            QueueStatus::SentinelPingExpired => "SENTINEL_PING_EXPIRED",
            QueueStatus::PoseBan => "POSE_BAN",
            QueueStatus::PoseBanned => "POSE_BANNED",
            QueueStatus::Other(status) => status,
        }
    }
}

impl From<&str> for QueueStatus {
    fn from(s: &str) -> Self {
        match s {
            "PRE_ENABLED" => QueueStatus::PreEnabled,
            "ENABLED" => QueueStatus::Enabled,
            "EXPIRED" => QueueStatus::Expired,
            "REMOVED" => QueueStatus::Removed,
            "VIN_SPENT" => QueueStatus::VinSpent,
            "OUTPOINT_SPENT" => QueueStatus::OutpointSpent,
            "UPDATE_REQUIRED" => QueueStatus::UpdateRequired,
            "WATCHDOG_EXPIRED" => QueueStatus::WatchdogExpired,
            "NEW_START_REQUIRED" => QueueStatus::NewStartRequired,
            "SENTINEL_PING_EXPIRED" => QueueStatus::SentinelPingExpired,
            "POSE_BAN" => QueueStatus::PoseBan,
            "POSE_BANNED" => QueueStatus::PoseBanned,
            other => QueueStatus::Other(other.to_string()),
        }
    }
}

impl FromStr for QueueStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(QueueStatus::from(s))
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a list row was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("bad collateral key: {0}")]
    Key(#[from] VinParseError),

    #[error("null collateral outpoint")]
    NullCollateral,

    #[error("row has no status")]
    MissingStatus,

    #[error("unexpected row type: {0}")]
    UnexpectedType(String),
}

/// One row of `masternodelist full`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MasternodeEntry {
    pub vin: Vin,
    pub queue_status: QueueStatus,
    pub raw_fields: BTreeMap<String, String>,
}

impl MasternodeEntry {
    /// Build an entry from a list key and its value. Either the whole row
    /// parses or the entry is not built.
    pub fn parse(key: &str, value: &Value) -> Result<MasternodeEntry, EntryError> {
        let vin = parse_outpoint(key)?.ok_or(EntryError::NullCollateral)?;
        let (queue_status, raw_fields) = match value {
            Value::String(row) => parse_row(row)?,
            Value::Object(fields) => {
                let status = fields
                    .get("status")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .ok_or(EntryError::MissingStatus)?;
                let raw_fields: BTreeMap<String, String> = fields
                    .iter()
                    .filter(|(name, _)| name.as_str() != "status")
                    .map(|(name, v)| {
                        let v = match v {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (name.clone(), v)
                    })
                    .collect();
                (QueueStatus::from(status), raw_fields)
            }
            other => return Err(EntryError::UnexpectedType(other.to_string())),
        };

        Ok(MasternodeEntry {
            vin,
            queue_status,
            raw_fields,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.queue_status == QueueStatus::Enabled
    }
}

/// Split a legacy whitespace separated row into status and named fields.
fn parse_row(row: &str) -> Result<(QueueStatus, BTreeMap<String, String>), EntryError> {
    let mut tokens = row.split_whitespace();
    let status = tokens.next().ok_or(EntryError::MissingStatus)?;
    let rest: Vec<&str> = tokens.collect();

    let names: Vec<String> = match rest.len() {
        7 => LEGACY_FIELDS.iter().map(|n| n.to_string()).collect(),
        4 => DIP3_FIELDS.iter().map(|n| n.to_string()).collect(),
        n => (1..=n).map(|i| format!("field{}", i)).collect(),
    };
    let fields: BTreeMap<String, String> =
        names.into_iter().zip(rest.into_iter().map(str::to_string)).collect();

    Ok((QueueStatus::from(status), fields))
}

/// Masternode list entries addressable by vin.
#[derive(Clone, Debug, Default)]
pub struct MasternodeRegistry {
    entries: HashMap<String, MasternodeEntry>,
}

impl MasternodeRegistry {
    /// Build from `masternodelist full [filter]`. Pass the vin as filter when
    /// only one entry is needed so the daemon does not send the whole list.
    pub fn fetch<R: RpcApi>(rpc: &R, filter: Option<&str>) -> mn_status_rpc::Result<Self> {
        let list = rpc.get_masternode_list_full(filter)?;
        Ok(Self::from_list(list))
    }

    /// Rows that do not parse are skipped with a warning; the rest are kept.
    pub fn from_list(list: MasternodeListResult) -> Self {
        let mut entries = HashMap::with_capacity(list.len());
        for (key, value) in list {
            match MasternodeEntry::parse(&key, &value) {
                Ok(entry) => {
                    entries.insert(entry.vin.to_string(), entry);
                }
                Err(e) => warn!("skipping masternode list entry {}: {}", key, e),
            }
        }
        debug!("masternode registry built with {} entries", entries.len());
        MasternodeRegistry {
            entries,
        }
    }

    pub fn lookup(&self, vin: &str) -> Option<&MasternodeEntry> {
        self.entries.get(vin)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MasternodeEntry> {
        self.entries.values()
    }

    /// Number of entries currently `ENABLED`.
    pub fn enabled_count(&self) -> usize {
        self.iter().filter(|e| e.is_enabled()).count()
    }
}
