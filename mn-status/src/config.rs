//! RPC credentials from `dash.conf`.
//!
//! Lines are `key=value`; `#` starts a comment. Keys under a `[main]` or
//! `[test]` section header apply to that network only and override the
//! top-level value for it.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use mn_status_rpc::Auth;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Environment variable selecting the network profile.
pub const NETWORK_ENV_VAR: &str = "DASH_NETWORK";

/// Host used when `rpcconnect` is not set.
pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";

/// Which network's settings to read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NetworkProfile {
    #[default]
    Mainnet,
    Testnet,
}

impl NetworkProfile {
    /// Profile named by [`NETWORK_ENV_VAR`], mainnet when unset.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_env_value(std::env::var(NETWORK_ENV_VAR).ok().as_deref())
    }

    pub fn from_env_value(value: Option<&str>) -> ConfigResult<Self> {
        match value {
            None | Some("") => Ok(NetworkProfile::Mainnet),
            Some(value) => value.parse(),
        }
    }

    pub fn default_rpc_port(&self) -> u16 {
        match self {
            NetworkProfile::Mainnet => 9998,
            NetworkProfile::Testnet => 19998,
        }
    }

    /// `dash.conf` section holding this network's overrides.
    pub fn section(&self) -> &'static str {
        match self {
            NetworkProfile::Mainnet => "main",
            NetworkProfile::Testnet => "test",
        }
    }
}

impl FromStr for NetworkProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" | "main" => Ok(NetworkProfile::Mainnet),
            "testnet" | "test" => Ok(NetworkProfile::Testnet),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Connection settings for the daemon's JSON-RPC port.
#[derive(Clone, PartialEq, Eq)]
pub struct RpcCredentials {
    pub host: String,
    pub user: String,
    pub password: String,
    pub port: u16,
}

impl RpcCredentials {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn auth(&self) -> Auth {
        Auth::UserPass(self.user.clone(), self.password.clone())
    }
}

impl fmt::Debug for RpcCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcCredentials")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .finish()
    }
}

/// Parsed `dash.conf`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DashConfig {
    global: HashMap<String, String>,
    sections: HashMap<String, HashMap<String, String>>,
}

impl DashConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!("read config from {}", path.display());
        Ok(Self::parse(&text))
    }

    /// Later assignments of a key replace earlier ones.
    pub fn parse(text: &str) -> Self {
        let mut config = DashConfig::default();
        let mut section: Option<String> = None;

        for line in text.lines() {
            let line = match line.split_once('#') {
                Some((content, _comment)) => content,
                None => line,
            }
            .trim();
            if line.is_empty() {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = Some(name.trim().to_string());
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                debug!("ignoring config line without '=': {}", line);
                continue;
            };
            let (key, value) = (key.trim().to_string(), value.trim().to_string());
            match &section {
                Some(name) => {
                    config.sections.entry(name.clone()).or_default().insert(key, value);
                }
                None => {
                    config.global.insert(key, value);
                }
            }
        }

        config
    }

    /// Value of `key` for `profile`: the profile's section first, then the
    /// top level.
    pub fn get(&self, profile: NetworkProfile, key: &str) -> Option<&str> {
        self.sections
            .get(profile.section())
            .and_then(|section| section.get(key))
            .or_else(|| self.global.get(key))
            .map(String::as_str)
    }

    pub fn rpc_credentials(&self, profile: NetworkProfile) -> ConfigResult<RpcCredentials> {
        let user = self.get(profile, "rpcuser").ok_or(ConfigError::MissingKey("rpcuser"))?;
        let password =
            self.get(profile, "rpcpassword").ok_or(ConfigError::MissingKey("rpcpassword"))?;
        let port = match self.get(profile, "rpcport") {
            Some(port) => port.parse().map_err(|_| ConfigError::InvalidPort(port.to_string()))?,
            None => profile.default_rpc_port(),
        };
        let host = self.get(profile, "rpcconnect").unwrap_or(DEFAULT_RPC_HOST);

        Ok(RpcCredentials {
            host: host.to_string(),
            user: user.to_string(),
            password: password.to_string(),
            port,
        })
    }
}
