//! Logging setup.
//!
//! Console output goes to stderr; stdout is reserved for the status record.
//! A log file, when configured, is appended to so that successive scheduled
//! runs accumulate in one place.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{LoggingError, LoggingResult};

/// Guard that must be kept alive to ensure log flushing on shutdown.
#[derive(Debug)]
pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
}

/// Configuration for logging output.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Log level filter. If None, `RUST_LOG` is consulted, then WARN.
    pub level: Option<LevelFilter>,
    /// Whether to output logs to stderr.
    pub console: bool,
    /// File to append log lines to.
    pub file: Option<PathBuf>,
}

/// Initialize logging with the given configuration.
///
/// Keep the returned guard alive until exit; dropping it flushes the file
/// writer. With neither console nor file output, tracing macros are no-ops.
pub fn init_logging(config: LoggingConfig) -> LoggingResult<LoggingGuard> {
    if !config.console && config.file.is_none() {
        return Ok(LoggingGuard {
            _worker_guard: None,
        });
    }

    let env_filter = match config.level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(LevelFilter::WARN.to_string())),
    };

    let (file_layer, guard) = match config.file {
        Some(ref path) => {
            let (writer, guard) = open_log_file(path)?;
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = config
        .console
        .then(|| fmt::layer().with_target(true).with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| LoggingError::SubscriberInit(e.to_string()))?;

    Ok(LoggingGuard {
        _worker_guard: guard,
    })
}

fn open_log_file(path: &PathBuf) -> LoggingResult<(NonBlocking, WorkerGuard)> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let file: File = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(tracing_appender::non_blocking(file))
}

/// Parse a `--log-level` value.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    level.parse().ok()
}
