//! Governance parameters and the arithmetic built on them.
//!
//! [`Governance`] fetches `getgovernanceinfo` at most once and keeps the
//! snapshot for as long as it lives, which is one poll. A new snapshot means
//! a new facade.

use std::cell::OnceCell;

use mn_status_rpc::RpcApi;
use mn_status_rpc::json::{
    Amount, GObjectListResult, GetGovernanceInfoResult, MasternodeCount, MnBudgetShowResult,
};
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult, Result};

/// Daemon-wide governance parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemoteParameters {
    pub superblock_cycle: u32,
    pub min_quorum: u32,
    pub proposal_fee: Amount,
}

impl RemoteParameters {
    /// Votes needed to pass a governance decision: one tenth of the enabled
    /// masternodes (rounded down), never less than the minimum quorum.
    pub fn quorum(&self, total_enabled: u32) -> u32 {
        self.min_quorum.max(total_enabled / 10)
    }

    /// Height of the most recent superblock at or below `height`.
    pub fn last_superblock_height(&self, height: u32) -> ConfigResult<u32> {
        let cycle = self.cycle()?;
        Ok(cycle * (height / cycle))
    }

    /// Height of the first superblock after `height`'s last one.
    pub fn next_superblock_height(&self, height: u32) -> ConfigResult<u32> {
        Ok(self.last_superblock_height(height)? + self.superblock_cycle)
    }

    fn cycle(&self) -> ConfigResult<u32> {
        match self.superblock_cycle {
            0 => Err(ConfigError::ZeroSuperblockCycle),
            cycle => Ok(cycle),
        }
    }
}

impl From<GetGovernanceInfoResult> for RemoteParameters {
    fn from(info: GetGovernanceInfoResult) -> Self {
        RemoteParameters {
            superblock_cycle: info.superblock_cycle,
            min_quorum: info.governance_min_quorum,
            proposal_fee: info.proposal_fee,
        }
    }
}

/// Governance object listing, from whichever call the daemon supports.
#[derive(Clone, Debug, PartialEq)]
pub enum GovernanceObjects {
    /// `gobject list`
    Modern(GObjectListResult),
    /// `mnbudget show`, for daemons that predate governance objects.
    LegacyBudget(MnBudgetShowResult),
}

impl GovernanceObjects {
    pub fn len(&self) -> usize {
        match self {
            GovernanceObjects::Modern(objects) => objects.len(),
            GovernanceObjects::LegacyBudget(budgets) => budgets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lazily fetched, per-poll view of the daemon's governance state.
pub struct Governance<'a, R: RpcApi> {
    rpc: &'a R,
    params: OnceCell<RemoteParameters>,
}

impl<'a, R: RpcApi> Governance<'a, R> {
    /// The first parameter access performs the `getgovernanceinfo` call.
    pub fn new(rpc: &'a R) -> Self {
        Governance {
            rpc,
            params: OnceCell::new(),
        }
    }

    /// Use an already fetched snapshot; no `getgovernanceinfo` call is made.
    pub fn with_params(rpc: &'a R, params: RemoteParameters) -> Self {
        Governance {
            rpc,
            params: OnceCell::from(params),
        }
    }

    pub fn params(&self) -> Result<&RemoteParameters> {
        if let Some(params) = self.params.get() {
            return Ok(params);
        }
        let info = self.rpc.get_governance_info()?;
        debug!(
            superblock_cycle = info.superblock_cycle,
            min_quorum = info.governance_min_quorum,
            "fetched governance info"
        );
        Ok(self.params.get_or_init(|| info.into()))
    }

    pub fn superblock_cycle(&self) -> Result<u32> {
        Ok(self.params()?.superblock_cycle)
    }

    pub fn min_quorum(&self) -> Result<u32> {
        Ok(self.params()?.min_quorum)
    }

    pub fn proposal_fee(&self) -> Result<Amount> {
        Ok(self.params()?.proposal_fee)
    }

    pub fn quorum(&self, total_enabled: u32) -> Result<u32> {
        Ok(self.params()?.quorum(total_enabled))
    }

    /// Quorum for the network's current size.
    pub fn governance_quorum(&self) -> Result<u32> {
        let enabled = self.enabled_masternode_count()?;
        self.quorum(enabled)
    }

    /// `masternode count enabled`, or `masternode count` on daemons that
    /// reject the mode argument.
    pub fn enabled_masternode_count(&self) -> Result<u32> {
        let count = match self.rpc.get_masternode_count(Some("enabled")) {
            Ok(count) => count,
            Err(e) if !e.is_transport() => {
                debug!("masternode count enabled rejected ({}), retrying without mode", e);
                self.rpc.get_masternode_count(None)?
            }
            Err(e) => return Err(e.into()),
        };
        if let MasternodeCount::Legacy(_) = count {
            debug!("daemon returned a bare masternode count");
        }
        Ok(count.enabled())
    }

    pub fn last_superblock_height(&self, height: u32) -> Result<u32> {
        Ok(self.params()?.last_superblock_height(height)?)
    }

    pub fn next_superblock_height(&self, height: u32) -> Result<u32> {
        Ok(self.params()?.next_superblock_height(height)?)
    }

    /// Last superblock height relative to the daemon's current block count.
    pub fn current_last_superblock_height(&self) -> Result<u32> {
        let height = self.rpc.get_block_count()?;
        self.last_superblock_height(height)
    }

    /// Next superblock height relative to the daemon's current block count.
    pub fn current_next_superblock_height(&self) -> Result<u32> {
        let height = self.rpc.get_block_count()?;
        self.next_superblock_height(height)
    }

    /// `gobject list`, falling back once to `mnbudget show` when the daemon
    /// rejects the former. Transport failures are returned as is.
    pub fn objects(&self) -> Result<GovernanceObjects> {
        match self.rpc.get_gobject_list() {
            Ok(objects) => Ok(GovernanceObjects::Modern(objects)),
            Err(e) if !e.is_transport() => {
                warn!("gobject list failed ({}), falling back to mnbudget show", e);
                Ok(GovernanceObjects::LegacyBudget(self.rpc.get_mnbudget_show()?))
            }
            Err(e) => Err(e.into()),
        }
    }
}
