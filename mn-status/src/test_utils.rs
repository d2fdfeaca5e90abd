//! In-memory daemon for exercising the status check without dashd.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;

use mn_status_rpc::{Error, RpcApi, RpcError};
use serde_json::{Value, json};

/// A `<txid>-<index>` outpoint whose txid repeats `c` 64 times.
pub fn outpoint(c: char, index: u32) -> String {
    format!("{}-{}", c.to_string().repeat(64), index)
}

#[derive(Clone, Debug)]
enum Reply {
    Value(Value),
    Rpc(i32, String),
    Transport,
}

/// Canned replies keyed by `"<cmd> <arg> <arg>..."`, with string arguments
/// unquoted: `masternode status`, `masternodelist full <vin>`.
///
/// Calls without a canned reply fail like an unknown method on dashd.
#[derive(Debug, Default)]
pub struct MockDaemon {
    replies: HashMap<String, Reply>,
    calls: RefCell<Vec<String>>,
}

impl MockDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, call: &str, value: Value) -> Self {
        self.replies.insert(call.to_string(), Reply::Value(value));
        self
    }

    pub fn with_rpc_error(mut self, call: &str, code: i32, message: &str) -> Self {
        self.replies.insert(call.to_string(), Reply::Rpc(code, message.to_string()));
        self
    }

    pub fn with_transport_error(mut self, call: &str) -> Self {
        self.replies.insert(call.to_string(), Reply::Transport);
        self
    }

    pub fn with_governance_info(self, min_quorum: u32, superblock_cycle: u32) -> Self {
        self.with_reply(
            "getgovernanceinfo",
            json!({
                "governanceminquorum": min_quorum,
                "masternodewatchdogmaxseconds": 7200,
                "proposalfee": 5.0,
                "superblockcycle": superblock_cycle,
            }),
        )
    }

    pub fn with_chain(self, chain: &str) -> Self {
        self.with_reply("getblockchaininfo", json!({ "chain": chain, "blocks": 1000 }))
    }

    pub fn with_sync(self, synced: bool) -> Self {
        self.with_reply(
            "mnsync status",
            json!({
                "AssetID": 999,
                "AssetName": "MASTERNODE_SYNC_FINISHED",
                "IsBlockchainSynced": true,
                "IsMasternodeListSynced": true,
                "IsWinnersListSynced": synced,
                "IsSynced": synced,
                "IsFailed": false,
            }),
        )
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// How many times exactly `call` was made.
    pub fn call_count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.as_str() == call).count()
    }

    fn key(cmd: &str, args: &[Value]) -> String {
        let mut key = cmd.to_string();
        for arg in args {
            key.push(' ');
            match arg {
                Value::String(s) => key.push_str(s),
                other => key.push_str(&other.to_string()),
            }
        }
        key
    }
}

impl RpcApi for MockDaemon {
    fn call<T: for<'a> serde::de::Deserialize<'a>>(
        &self,
        cmd: &str,
        args: &[Value],
    ) -> mn_status_rpc::Result<T> {
        let key = Self::key(cmd, args);
        self.calls.borrow_mut().push(key.clone());

        match self.replies.get(&key) {
            Some(Reply::Value(value)) => Ok(serde_json::from_value(value.clone())?),
            Some(Reply::Rpc(code, message)) => Err(Error::Rpc(RpcError {
                code: *code,
                message: message.clone(),
            })),
            Some(Reply::Transport) => Err(Error::Transport(Box::new(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "Connection refused (os error 111)",
            )))),
            None => Err(Error::Rpc(RpcError {
                code: -32601,
                message: format!("Method not found: {}", key),
            })),
        }
    }
}
