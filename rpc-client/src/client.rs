use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use serde::Serialize;
use serde_json::value::RawValue;
use tracing::{debug, trace};

use crate::error::Error;
use crate::json;

pub type Result<T> = std::result::Result<T, Error>;

/// Shorthand for converting a variable into a serde_json::Value.
fn into_json<T>(val: T) -> Result<serde_json::Value>
where
    T: Serialize,
{
    Ok(serde_json::to_value(val)?)
}

/// The different authentication methods for the client.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Auth {
    None,
    UserPass(String, String),
    CookieFile(PathBuf),
}

impl Auth {
    /// Convert into the arguments that jsonrpc::Client needs.
    pub fn get_user_pass(self) -> Result<(Option<String>, Option<String>)> {
        match self {
            Auth::None => Ok((None, None)),
            Auth::UserPass(u, p) => Ok((Some(u), Some(p))),
            Auth::CookieFile(path) => {
                let line = BufReader::new(File::open(path)?)
                    .lines()
                    .next()
                    .ok_or(Error::InvalidCookieFile)??;
                let colon = line.find(':').ok_or(Error::InvalidCookieFile)?;
                Ok((Some(line[..colon].into()), Some(line[colon + 1..].into())))
            }
        }
    }
}

/// The calls a masternode status check makes against dashd.
///
/// Only [`RpcApi::call`] has to be provided; every other method is a typed
/// wrapper around it.
pub trait RpcApi: Sized {
    /// Call a `cmd` rpc with given `args` list
    fn call<T: for<'a> serde::de::Deserialize<'a>>(
        &self,
        cmd: &str,
        args: &[serde_json::Value],
    ) -> Result<T>;

    fn get_governance_info(&self) -> Result<json::GetGovernanceInfoResult> {
        self.call("getgovernanceinfo", &[])
    }

    fn get_block_count(&self) -> Result<u32> {
        self.call("getblockcount", &[])
    }

    /// Hex encoded hash of the block at `height`.
    fn get_block_hash(&self, height: u32) -> Result<String> {
        self.call("getblockhash", &[into_json(height)?])
    }

    fn get_blockchain_info(&self) -> Result<json::GetBlockchainInfoResult> {
        self.call("getblockchaininfo", &[])
    }

    /// `masternodelist full [filter]`. The filter narrows the daemon side
    /// listing, usually to a single collateral outpoint.
    fn get_masternode_list_full(
        &self,
        filter: Option<&str>,
    ) -> Result<json::MasternodeListResult> {
        let mut args = vec![into_json("full")?];
        if let Some(filter) = filter {
            args.push(into_json(filter)?);
        }
        self.call("masternodelist", &args)
    }

    fn get_masternode_status(&self) -> Result<json::MasternodeStatus> {
        self.call("masternode", &[into_json("status")?])
    }

    /// `masternode count [mode]`
    fn get_masternode_count(&self, mode: Option<&str>) -> Result<json::MasternodeCount> {
        let mut args = vec![into_json("count")?];
        if let Some(mode) = mode {
            args.push(into_json(mode)?);
        }
        self.call("masternode", &args)
    }

    fn get_mnsync_status(&self) -> Result<json::MnSyncStatus> {
        self.call("mnsync", &[into_json("status")?])
    }

    fn get_gobject_list(&self) -> Result<json::GObjectListResult> {
        self.call("gobject", &[into_json("list")?])
    }

    /// Budget listing of pre-governance-object daemons.
    fn get_mnbudget_show(&self) -> Result<json::MnBudgetShowResult> {
        self.call("mnbudget", &[into_json("show")?])
    }
}

/// Client implements a JSON-RPC client for the Dash Core daemon or compatible APIs.
pub struct Client {
    client: jsonrpc::client::Client,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "mn_status_rpc::Client({:?})", self.client)
    }
}

impl Client {
    /// Creates a client to a dashd JSON-RPC server.
    ///
    /// Fails when the URL cannot be parsed or the cookie file cannot be read.
    pub fn new(url: &str, auth: Auth) -> Result<Self> {
        let (user, pass) = auth.get_user_pass()?;
        jsonrpc::client::Client::simple_http(url, user, pass)
            .map(|client| Client {
                client,
            })
            .map_err(Error::from)
    }
}

impl RpcApi for Client {
    fn call<T: for<'a> serde::de::Deserialize<'a>>(
        &self,
        cmd: &str,
        args: &[serde_json::Value],
    ) -> Result<T> {
        let raw_args = args
            .iter()
            .map(|a| {
                let json_string = serde_json::to_string(a)?;
                RawValue::from_string(json_string).map_err(Error::Json)
            })
            .collect::<Result<Vec<_>>>()?;
        let req = self.client.build_request(cmd, &raw_args);
        debug!(target: "mn_status_rpc", "JSON-RPC request: {} {}", cmd, serde_json::Value::from(args));

        let resp = self.client.send_request(req).map_err(Error::from);
        log_response(cmd, &resp);
        Ok(resp?.result()?)
    }
}

fn log_response(cmd: &str, resp: &Result<jsonrpc::Response>) {
    match resp {
        Err(e) => debug!(target: "mn_status_rpc", "JSON-RPC failed parsing reply of {}: {}", cmd, e),
        Ok(resp) => {
            if let Some(ref e) = resp.error {
                debug!(target: "mn_status_rpc", "JSON-RPC error for {}: {:?}", cmd, e);
            } else if let Some(ref result) = resp.result {
                trace!(target: "mn_status_rpc", "JSON-RPC response for {}: {}", cmd, result);
            } else {
                trace!(target: "mn_status_rpc", "JSON-RPC response for {}: null", cmd);
            }
        }
    }
}
