use std::{error, fmt, io};

use thiserror::Error;

/// Error reported by the daemon for a specific call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// The error type for errors produced in this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The daemon could not be reached: refused connection, timeout,
    /// HTTP level failure.
    #[error("transport error: {0}")]
    Transport(Box<dyn error::Error + Send + Sync>),

    /// The daemon answered but rejected or failed the call.
    #[error("daemon rejected call: {0}")]
    Rpc(RpcError),

    /// The response could not be decoded into the expected type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid cookie file")]
    InvalidCookieFile,

    /// JSON-RPC envelope violations (nonce or version mismatch).
    #[error("JSON-RPC protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Whether this error means the daemon was not reachable at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// The daemon-reported error, if this is one.
    pub fn rpc_error(&self) -> Option<&RpcError> {
        match self {
            Error::Rpc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonrpc::Error> for Error {
    fn from(e: jsonrpc::Error) -> Error {
        match e {
            jsonrpc::Error::Transport(e) => Error::Transport(e),
            jsonrpc::Error::Rpc(e) => Error::Rpc(RpcError {
                code: e.code,
                message: e.message,
            }),
            jsonrpc::Error::Json(e) => Error::Json(e),
            e => Error::Protocol(e.to_string()),
        }
    }
}

impl From<jsonrpc::simple_http::Error> for Error {
    fn from(e: jsonrpc::simple_http::Error) -> Error {
        Error::from(jsonrpc::Error::from(e))
    }
}
