//! Export of the status as an AWS CloudWatch metric through the `aws` CLI.

use std::env;
use std::process::Command;

use tracing::{debug, info};

use crate::error::MetricError;
use crate::status::{Outcome, StatusRecord};

pub const NAMESPACE: &str = "DashCore";
pub const METRIC_NAME: &str = "MasternodeStatus";

/// Program invoked to submit the metric.
const AWS_CLI: &str = "aws";

/// Directory prepended to `PATH` so a pip-installed `aws` is found.
const AWS_CLI_DIR: &str = "/usr/local/bin";

/// Network dimension used for the empty record.
const UNKNOWN_NETWORK: &str = "unknown";

/// One `put-metric-data` submission.
#[derive(Clone, Debug, PartialEq)]
pub struct CloudWatchMetric {
    pub hostname: String,
    pub network: String,
    pub value: f64,
}

impl CloudWatchMetric {
    /// The empty record exports as unhealthy on the `unknown` network.
    pub fn from_record(record: &StatusRecord, hostname: &str) -> Self {
        CloudWatchMetric {
            hostname: hostname.to_string(),
            network: record
                .network()
                .map_or_else(|| UNKNOWN_NETWORK.to_string(), |n| n.to_string()),
            value: record.status_ok(),
        }
    }

    /// A daemon stopped at the sync gate exports like the empty record, so
    /// alarms see `0` rather than missing data.
    pub fn from_outcome(outcome: &Outcome, hostname: &str) -> Self {
        match outcome {
            Outcome::Reported(record) => Self::from_record(record, hostname),
            Outcome::Unsynced(_) => Self::from_record(&StatusRecord::Empty {}, hostname),
        }
    }

    /// Arguments to the `aws` CLI.
    pub fn args(&self) -> Vec<String> {
        vec![
            "cloudwatch".to_string(),
            "put-metric-data".to_string(),
            "--namespace".to_string(),
            NAMESPACE.to_string(),
            "--metric-name".to_string(),
            METRIC_NAME.to_string(),
            "--dimensions".to_string(),
            format!("Hostname={},Network={}", self.hostname, self.network),
            "--value".to_string(),
            format!("{:.1}", self.value),
        ]
    }

    /// Shell rendering of the invocation, for display.
    pub fn command_line(&self) -> String {
        let mut line = AWS_CLI.to_string();
        for arg in self.args() {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }

    /// Run `aws` and wait for it.
    pub fn send(&self) -> Result<(), MetricError> {
        let path = match env::var("PATH") {
            Ok(path) if !path.is_empty() => format!("{}:{}", AWS_CLI_DIR, path),
            _ => AWS_CLI_DIR.to_string(),
        };
        debug!("running {}", self.command_line());

        let status = Command::new(AWS_CLI)
            .args(self.args())
            .env("PATH", path)
            .status()
            .map_err(|source| MetricError::Spawn {
                program: AWS_CLI.to_string(),
                source,
            })?;
        if !status.success() {
            return Err(MetricError::Failed {
                program: AWS_CLI.to_string(),
                status,
            });
        }
        info!("sent {} metric to CloudWatch", METRIC_NAME);
        Ok(())
    }
}

/// Name of this host as the kernel reports it.
pub fn hostname() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}
