//! Error types for the masternode status check.

use std::io;

use thiserror::Error;

use crate::vin::VinParseError;

/// Main error type for the masternode status check.
#[derive(Debug, Error)]
pub enum Error {
    /// The connectivity probe failed; nothing else was attempted.
    #[error(
        "Cannot connect to dashd. Please ensure dashd is running and the JSONRPC port open: {0}"
    )]
    Connect(#[source] mn_status_rpc::Error),

    #[error("RPC error: {0}")]
    Rpc(#[from] mn_status_rpc::Error),

    #[error("Vin parse error: {0}")]
    Parse(#[from] VinParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("Metric export error: {0}")]
    Metric(#[from] MetricError),
}

impl Error {
    /// Whether the daemon could not be reached, either at the probe or later.
    pub fn is_transport(&self) -> bool {
        match self {
            Error::Connect(_) => true,
            Error::Rpc(e) => e.is_transport(),
            _ => false,
        }
    }
}

/// Configuration errors: unreadable `dash.conf`, missing credentials,
/// degenerate governance parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("invalid rpcport value: {0}")]
    InvalidPort(String),

    #[error("unknown network profile: {0}")]
    UnknownNetwork(String),

    #[error("superblock cycle reported by dashd is zero")]
    ZeroSuperblockCycle,
}

/// Logging-related errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file: {0}")]
    FileOpen(#[from] io::Error),

    #[error("Subscriber initialization failed: {0}")]
    SubscriberInit(String),
}

/// Metric export errors.
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
    },
}

/// Type alias for Result with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Type alias for configuration results.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Type alias for logging results.
pub type LoggingResult<T> = std::result::Result<T, LoggingError>;

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_connect_error_message_is_actionable() {
        let io = io::Error::new(io::ErrorKind::ConnectionRefused, "Connection refused");
        let err = Error::Connect(mn_status_rpc::Error::Transport(Box::new(io)));
        let message = err.to_string();
        assert!(message.starts_with("Cannot connect to dashd."));
        assert!(message.contains("Connection refused"));
        assert!(err.is_transport());
    }

    #[test]
    fn test_rpc_error_classification() {
        let rpc = mn_status_rpc::Error::Rpc(mn_status_rpc::RpcError {
            code: -1,
            message: "masternode not found".to_string(),
        });
        let err: Error = rpc.into();
        assert_matches!(err, Error::Rpc(_));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_config_error_conversion() {
        let err: Error = ConfigError::ZeroSuperblockCycle.into();
        assert_eq!(
            err.to_string(),
            "Configuration error: superblock cycle reported by dashd is zero"
        );
    }
}
