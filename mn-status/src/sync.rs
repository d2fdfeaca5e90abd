//! Daemon sync state.

use mn_status_rpc::RpcApi;
use mn_status_rpc::json::MnSyncStatus;
use serde::Serialize;

/// Sync flags reported by `mnsync status`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SyncState {
    pub blockchain_synced: bool,
    pub masternode_list_synced: bool,
    pub winners_list_synced: bool,
    pub overall_synced: bool,
    pub failed: bool,
}

impl SyncState {
    /// Poll the daemon. Never cached: every call reflects the latest reply.
    pub fn fetch<R: RpcApi>(rpc: &R) -> mn_status_rpc::Result<SyncState> {
        rpc.get_mnsync_status().map(SyncState::from)
    }

    /// True only when every positive flag is set and `failed` is not.
    pub fn is_synced(&self) -> bool {
        self.blockchain_synced
            && self.masternode_list_synced
            && self.winners_list_synced
            && self.overall_synced
            && !self.failed
    }
}

impl From<MnSyncStatus> for SyncState {
    /// DIP3-era daemons no longer report the list/winners/failed flags; an
    /// absent positive flag counts as set and an absent `IsFailed` as clear.
    fn from(status: MnSyncStatus) -> Self {
        SyncState {
            blockchain_synced: status.is_blockchain_synced,
            masternode_list_synced: status.is_masternode_list_synced.unwrap_or(true),
            winners_list_synced: status.is_winners_list_synced.unwrap_or(true),
            overall_synced: status.is_synced,
            failed: status.is_failed.unwrap_or(false),
        }
    }
}
