//! Status derivation.
//!
//! One poll walks `DISCONNECTED -> CONNECTED -> (SYNCED | UNSYNCED) ->
//! STATUS_RESOLVED -> REPORTED` as a fixed sequence of blocking calls. The
//! sync gate only applies to [`Mode::Full`]; [`Mode::StatusOnly`] goes
//! straight from connected to status resolution.

use std::fmt;

use mn_status_rpc::RpcApi;
use mn_status_rpc::json::MasternodeStatus;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::governance::Governance;
use crate::registry::{MasternodeRegistry, QueueStatus};
use crate::sync::SyncState;
use crate::vin::{Vin, VinParseError, parse_outpoint, parse_status_vin};

/// `masternode status` message of a legacy masternode that is running.
///
/// Compared verbatim; DIP3-era daemons word their status differently
/// ("Ready") and never match.
pub const STARTED_MESSAGE: &str = "Masternode successfully started";

/// Network label of a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// Map `getblockchaininfo.chain` to a label. Only `test` is testnet;
    /// regtest and devnets report as mainnet, as `getinfo.testnet` did.
    pub fn from_chain(chain: &str) -> Network {
        match chain {
            "test" => Network::Testnet,
            _ => Network::Mainnet,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of the local masternode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status_message: String,
    pub vin: Option<String>,
    pub queue_status: String,
    pub network: Network,
    /// `1.0` when healthy, `0.0` otherwise. A float so it can be exported
    /// as a metric value unchanged.
    pub status_ok: f64,
}

impl StatusReport {
    pub fn is_ok(&self) -> bool {
        self.status_ok == 1.0
    }
}

/// What one poll produced: a report, or the empty record `{}` when the
/// daemon could not answer. Consumers treat the empty record as unhealthy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusRecord {
    Report(StatusReport),
    Empty {},
}

impl StatusRecord {
    pub fn report(&self) -> Option<&StatusReport> {
        match self {
            StatusRecord::Report(report) => Some(report),
            StatusRecord::Empty {} => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, StatusRecord::Empty {})
    }

    pub fn status_ok(&self) -> f64 {
        self.report().map_or(0.0, |r| r.status_ok)
    }

    pub fn network(&self) -> Option<Network> {
        self.report().map(|r| r.network)
    }
}

/// `1.0` iff the daemon says the masternode started and the list has it
/// `ENABLED`; either condition alone is not enough.
pub fn status_ok(status_message: &str, queue_status: &str) -> f64 {
    if status_message == STARTED_MESSAGE && queue_status == QueueStatus::Enabled.as_str() {
        1.0
    } else {
        0.0
    }
}

/// Collateral of the local masternode from a `masternode status` reply.
///
/// The structured `outpoint` field wins over the legacy `vin` text. A reply
/// with neither means the node has no collateral.
pub fn vin_from_status(status: &MasternodeStatus) -> std::result::Result<Option<Vin>, VinParseError> {
    match (&status.outpoint, &status.vin) {
        (Some(outpoint), _) => parse_outpoint(outpoint),
        (None, Some(vin)) => parse_status_vin(vin),
        (None, None) => Ok(None),
    }
}

/// Which workflow a poll runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    /// Connect, require a synced daemon, report.
    #[default]
    Full,
    /// Connect and report; sync state is not consulted.
    StatusOnly,
}

/// Terminal state of a poll that reached the daemon.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Reported(StatusRecord),
    /// Full mode stopped at the sync gate; no report.
    Unsynced(SyncState),
}

/// Derives the masternode status from a daemon.
pub struct StatusEngine<'a, R: RpcApi> {
    rpc: &'a R,
}

impl<'a, R: RpcApi> StatusEngine<'a, R> {
    pub fn new(rpc: &'a R) -> Self {
        StatusEngine {
            rpc,
        }
    }

    /// Run one poll in the given mode.
    ///
    /// Fails with [`Error::Connect`] when the probe fails, and with a
    /// transport [`Error::Rpc`] when the daemon goes away mid-poll. Any other
    /// error after the probe yields the empty record.
    pub fn run(&self, mode: Mode) -> Result<Outcome> {
        self.connect()?;

        if mode == Mode::Full {
            let sync = match self.sync_state() {
                Ok(sync) => sync,
                Err(e) if e.is_transport() => return Err(e),
                Err(e) => {
                    warn!("sync state unavailable: {}", e);
                    return Ok(Outcome::Reported(StatusRecord::Empty {}));
                }
            };
            if !sync.is_synced() {
                info!("dashd is not synced: {:?}", sync);
                return Ok(Outcome::Unsynced(sync));
            }
            debug!("dashd synced");
        }

        Ok(Outcome::Reported(self.mn_status()?))
    }

    /// Connectivity probe. The returned facade is seeded with the probe's
    /// `getgovernanceinfo` reply, so governance queries made through it cost
    /// no further round trip for that call.
    pub fn connect(&self) -> Result<Governance<'a, R>> {
        match self.rpc.get_governance_info() {
            Ok(info) => {
                debug!(
                    superblock_cycle = info.superblock_cycle,
                    min_quorum = info.governance_min_quorum,
                    "connected to dashd"
                );
                Ok(Governance::with_params(self.rpc, info.into()))
            }
            Err(e) => Err(Error::Connect(e)),
        }
    }

    pub fn sync_state(&self) -> Result<SyncState> {
        Ok(SyncState::fetch(self.rpc)?)
    }

    pub fn is_synced(&self) -> Result<bool> {
        Ok(self.sync_state()?.is_synced())
    }

    pub fn network(&self) -> Result<Network> {
        Ok(self.fetch_network()?)
    }

    /// Collateral of the local masternode.
    ///
    /// `Ok(None)` when the daemon reports the null outpoint; a vin that
    /// cannot be parsed is [`Error::Parse`].
    pub fn current_vin(&self) -> Result<Option<Vin>> {
        let status = self.rpc.get_masternode_status()?;
        Ok(vin_from_status(&status)?)
    }

    /// Whether the daemon runs as a masternode. A daemon that rejects
    /// `masternode status` is not one.
    pub fn is_masternode(&self) -> Result<bool> {
        match self.current_vin() {
            Ok(vin) => Ok(vin.is_some()),
            Err(Error::Rpc(e)) if !e.is_transport() => {
                debug!("masternode status rejected: {}", e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Hash of the chain tip.
    pub fn current_block_hash(&self) -> Result<String> {
        let height = self.rpc.get_block_count()?;
        Ok(self.rpc.get_block_hash(height)?)
    }

    /// Build the status record. Daemon errors degrade to the empty record;
    /// only transport failures are returned.
    pub fn mn_status(&self) -> Result<StatusRecord> {
        match self.resolve_status() {
            Ok(report) => Ok(StatusRecord::Report(report)),
            Err(e) if e.is_transport() => Err(e.into()),
            Err(e) => {
                warn!("masternode status unavailable: {}", e);
                Ok(StatusRecord::Empty {})
            }
        }
    }

    fn resolve_status(&self) -> mn_status_rpc::Result<StatusReport> {
        let status = self.rpc.get_masternode_status()?;
        let vin = match vin_from_status(&status) {
            Ok(vin) => vin,
            Err(e) => {
                warn!("ignoring unparseable masternode vin: {}", e);
                None
            }
        };

        let queue_status = match &vin {
            Some(vin) => self.queue_status(vin)?,
            None => String::new(),
        };
        let status_ok = status_ok(&status.status, &queue_status);
        let network = self.fetch_network()?;

        Ok(StatusReport {
            status_message: status.status,
            vin: vin.map(|vin| vin.to_string()),
            queue_status,
            network,
            status_ok,
        })
    }

    /// Queue status of one collateral, via a list call narrowed to it.
    fn queue_status(&self, vin: &Vin) -> mn_status_rpc::Result<String> {
        let key = vin.to_string();
        let registry = MasternodeRegistry::fetch(self.rpc, Some(&key))?;
        Ok(registry.lookup(&key).map(|entry| entry.queue_status.to_string()).unwrap_or_default())
    }

    fn fetch_network(&self) -> mn_status_rpc::Result<Network> {
        let info = self.rpc.get_blockchain_info()?;
        Ok(Network::from_chain(&info.chain))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::test_utils::outpoint;

    fn mn_status(vin: Option<&str>, outpoint: Option<&str>) -> MasternodeStatus {
        MasternodeStatus {
            vin: vin.map(str::to_string),
            outpoint: outpoint.map(str::to_string),
            service: None,
            pubkey: None,
            pro_tx_hash: None,
            state: None,
            status: STARTED_MESSAGE.to_string(),
        }
    }

    #[test]
    fn test_status_ok_requires_both_conditions() {
        assert_eq!(status_ok(STARTED_MESSAGE, "ENABLED"), 1.0);
        assert_eq!(status_ok(STARTED_MESSAGE, "PRE_ENABLED"), 0.0);
        assert_eq!(status_ok(STARTED_MESSAGE, ""), 0.0);
        assert_eq!(status_ok("Not capable masternode", "ENABLED"), 0.0);
        assert_eq!(status_ok("Ready", "ENABLED"), 0.0);
    }

    #[test]
    fn test_network_from_chain() {
        assert_eq!(Network::from_chain("main"), Network::Mainnet);
        assert_eq!(Network::from_chain("test"), Network::Testnet);
        assert_eq!(Network::from_chain("regtest"), Network::Mainnet);
    }

    #[test]
    fn test_empty_record_serializes_as_empty_object() {
        let empty = StatusRecord::Empty {};
        assert_eq!(serde_json::to_string(&empty).unwrap(), "{}");
        assert_eq!(empty.status_ok(), 0.0);
        assert_eq!(empty.network(), None);
        assert_eq!(serde_json::from_str::<StatusRecord>("{}").unwrap(), empty);
    }

    #[test]
    fn test_report_serializes_with_snake_case_keys() {
        let record = StatusRecord::Report(StatusReport {
            status_message: STARTED_MESSAGE.to_string(),
            vin: None,
            queue_status: String::new(),
            network: Network::Testnet,
            status_ok: 0.0,
        });
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status_message"], STARTED_MESSAGE);
        assert!(value["vin"].is_null());
        assert_eq!(value["queue_status"], "");
        assert_eq!(value["network"], "testnet");
        assert_eq!(value["status_ok"], 0.0);
    }

    #[test]
    fn test_vin_from_status_prefers_outpoint() {
        let structured = outpoint('a', 1);
        let legacy = format!("CTxIn(COutPoint({}, 2), scriptSig=)", "b".repeat(64));
        let vin = vin_from_status(&mn_status(Some(&legacy), Some(&structured))).unwrap();
        assert_eq!(vin.unwrap().to_string(), structured);

        let vin = vin_from_status(&mn_status(Some(&legacy), None)).unwrap();
        assert_eq!(vin.unwrap().index(), 2);

        assert_eq!(vin_from_status(&mn_status(None, None)).unwrap(), None);
    }

    #[test]
    fn test_vin_from_status_distinguishes_sentinel_from_garbage() {
        let sentinel = format!("CTxIn(COutPoint({}, 4294967295), coinbase )", "0".repeat(64));
        assert_eq!(vin_from_status(&mn_status(Some(&sentinel), None)), Ok(None));
        assert_matches!(
            vin_from_status(&mn_status(Some("garbage"), None)),
            Err(VinParseError::MissingOutPoint(_))
        );
    }
}
