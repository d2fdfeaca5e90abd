//! # mn-status rpc-client
//!
//! A blocking JSON-RPC client for the dashd calls behind the masternode
//! status check.
//!
//! Everything goes through the [`RpcApi`] trait, so callers can be handed a
//! real [`Client`] or any other implementation that answers `call`.

pub extern crate jsonrpc;

pub extern crate mn_status_rpc_json;
pub use mn_status_rpc_json as json;

mod client;
mod error;

pub use crate::client::*;
pub use crate::error::{Error, RpcError};
