//! Command-line interface for the masternode status check.

use std::path::PathBuf;
use std::process;

use clap::{Arg, ArgAction, Command};
use tracing::level_filters::LevelFilter;

use mn_status::logging::parse_level;
use mn_status::metrics::hostname;
use mn_status::{
    CloudWatchMetric, DashConfig, Error, LoggingConfig, Mode, NetworkProfile, Outcome,
    StatusEngine, init_logging,
};
use mn_status_rpc::Client;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("mn-status")
        .version(mn_status::VERSION)
        .about("Report whether the local Dash masternode is started and enabled")
        .arg(
            Arg::new("dash-conf")
                .short('c')
                .long("dash-conf")
                .value_name("FILE")
                .help("dash config file with credentials")
                .required(true),
        )
        .arg(
            Arg::new("status-only")
                .long("status-only")
                .help("Report status without requiring a synced daemon")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("send-cloudwatch-metric")
                .long("send-cloudwatch-metric")
                .help("Send masternode status metric (0 or 1) to AWS CloudWatch via awscli")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level")
                .value_parser(["error", "warn", "info", "debug", "trace"])
                .default_value("warn"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("FILE")
                .help("Also append log output to this file"),
        )
        .get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .and_then(|level| parse_level(level))
        .unwrap_or(LevelFilter::WARN);
    let _logging_guard = init_logging(LoggingConfig {
        level: Some(level),
        console: true,
        file: matches.get_one::<String>("log-file").map(PathBuf::from),
    })?;

    let Some(conf_path) = matches.get_one::<String>("dash-conf") else {
        eprintln!("--dash-conf is required");
        process::exit(2);
    };

    let profile = match NetworkProfile::from_env() {
        Ok(profile) => profile,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };
    let credentials = match DashConfig::from_file(conf_path)
        .and_then(|config| config.rpc_credentials(profile))
    {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };
    tracing::info!("checking dashd at {} ({:?})", credentials.url(), profile);

    let client = match Client::new(&credentials.url(), credentials.auth()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create RPC client: {}", e);
            process::exit(1);
        }
    };

    let mode = if matches.get_flag("status-only") {
        Mode::StatusOnly
    } else {
        Mode::Full
    };

    let outcome = match StatusEngine::new(&client).run(mode) {
        Ok(outcome) => outcome,
        Err(e @ Error::Connect(_)) => {
            eprintln!("{}", e);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Status check failed: {}", e);
            process::exit(1);
        }
    };

    match &outcome {
        Outcome::Reported(record) => println!("{}", serde_json::to_string(record)?),
        Outcome::Unsynced(state) => {
            eprintln!("dashd is not synced yet, try again later: {:?}", state);
        }
    }

    if matches.get_flag("send-cloudwatch-metric") {
        let metric = CloudWatchMetric::from_outcome(&outcome, &hostname());
        eprintln!("cmd = {}", metric.command_line());
        eprint!("Sending metric to CloudWatch...");
        if let Err(e) = metric.send() {
            eprintln!(" failed: {}", e);
            process::exit(1);
        }
        eprintln!(" done.");
    }

    if let Outcome::Unsynced(_) = outcome {
        process::exit(1);
    }

    Ok(())
}
