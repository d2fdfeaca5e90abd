//! Dash masternode status checker.
//!
//! Polls a local dashd over JSON-RPC and answers one question: is this node
//! a started masternode that the network lists as `ENABLED`? The answer is a
//! small JSON record suitable for a monitoring agent or a CloudWatch metric.
//!
//! # Quick Start
//!
//! ```no_run
//! use mn_status::{DashConfig, Mode, NetworkProfile, Outcome, StatusEngine};
//! use mn_status_rpc::Client;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let creds = DashConfig::from_file("/home/dash/.dashcore/dash.conf")?
//!         .rpc_credentials(NetworkProfile::Mainnet)?;
//!     let client = Client::new(&creds.url(), creds.auth())?;
//!
//!     if let Outcome::Reported(record) = StatusEngine::new(&client).run(Mode::Full)? {
//!         println!("{}", serde_json::to_string(&record)?);
//!     }
//!     Ok(())
//! }
//! ```

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub mod config;
pub mod error;
pub mod governance;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod status;
pub mod sync;
pub mod vin;

// Re-export main types for convenience
pub use config::{DashConfig, NetworkProfile, RpcCredentials};
pub use error::{ConfigError, Error, LoggingError, LoggingResult, MetricError, Result};
pub use governance::{Governance, GovernanceObjects, RemoteParameters};
pub use logging::{LoggingConfig, LoggingGuard, init_logging};
pub use metrics::CloudWatchMetric;
pub use registry::{MasternodeEntry, MasternodeRegistry, QueueStatus};
pub use status::{Mode, Network, Outcome, StatusEngine, StatusRecord, StatusReport};
pub use sync::SyncState;
pub use vin::{Vin, VinParseError};

/// Current version of the checker.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
