use crate::coin::CoinIdentity;
use crate::daemon::StopTimeoutBehavior;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Default file name of the CLI front-end config (YAML, in the working directory)
pub const CLI_CONFIG_FILE: &str = "cli.yaml";

/// Default file name of the server front-end config (JSON, in the working directory)
pub const SERVER_CONFIG_FILE: &str = "server-config.json";

pub const DEFAULT_SERVER_IP: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 4000;

/// Persisted wallet manager configuration.
///
/// The same document shape backs both the CLI (`cli.yaml`) and server
/// (`server-config.json`) front-ends. Files written by earlier wallet
/// managers use PascalCase keys, a string `Port` and a numeric
/// `ProjectType`; those are accepted on load and rewritten in this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Display name of the wallet manager, e.g. "GoDivi"
    #[serde(alias = "AppName")]
    pub app_name: String,
    /// Which coin this installation manages
    #[serde(alias = "ProjectType", deserialize_with = "deserialize_coin")]
    pub project_type: CoinIdentity,
    /// Address of the wallet manager server
    #[serde(alias = "ServerIP")]
    pub server_ip: String,
    #[serde(alias = "Port", deserialize_with = "deserialize_port")]
    pub port: u16,
    /// Token presented to the wallet manager server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Set once the user has confirmed their recovery seed is backed up
    #[serde(default, alias = "UserConfirmedSeedRecovery")]
    pub user_confirmed_seed_recovery: bool,
    #[serde(default)]
    pub lifecycle: LifecycleSettings,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CoinField {
    Name(CoinIdentity),
    Index(u64),
}

fn deserialize_coin<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CoinIdentity, D::Error> {
    match CoinField::deserialize(deserializer)? {
        CoinField::Name(coin) => Ok(coin),
        CoinField::Index(index) => CoinIdentity::from_index(index)
            .ok_or_else(|| de::Error::custom(format!("unknown project type {}", index))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortField {
    Number(u16),
    Text(String),
}

fn deserialize_port<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    match PortField::deserialize(deserializer)? {
        PortField::Number(port) => Ok(port),
        PortField::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid port {:?}", text))),
    }
}

/// Retry and polling budgets used by the daemon lifecycle controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleSettings {
    /// Sleep between CLI command attempts
    #[serde(with = "humantime_serde")]
    pub cli_retry_interval: Duration,
    /// Attempts made by CLI queries while the daemon warms up
    pub cli_attempts: u32,
    /// Sleep between process-table polls while stopping
    #[serde(with = "humantime_serde")]
    pub stop_poll_interval: Duration,
    /// Polls made before a stop is considered timed out
    pub stop_max_polls: u32,
    /// Lines of daemon stdout read while looking for the startup banner
    pub banner_line_limit: usize,
    /// What to report when the daemon outlives the stop budget
    pub stop_timeout_behavior: StopTimeoutBehavior,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            cli_retry_interval: Duration::from_secs(3),
            cli_attempts: 30,
            stop_poll_interval: Duration::from_secs(3),
            stop_max_polls: 50,
            banner_line_limit: 3,
            stop_timeout_behavior: StopTimeoutBehavior::Fail,
        }
    }
}

impl WalletConfig {
    /// Default configuration for a freshly installed coin
    pub fn new_for(coin: CoinIdentity) -> Self {
        Self {
            app_name: coin.app_name().to_string(),
            project_type: coin,
            server_ip: DEFAULT_SERVER_IP.to_string(),
            port: DEFAULT_PORT,
            auth_token: None,
            user_confirmed_seed_recovery: false,
            lifecycle: LifecycleSettings::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.app_name.trim().is_empty() {
            return Err(ValidationError::InvalidGeneral(
                "app_name cannot be empty".to_string(),
            ));
        }

        if self.server_ip.parse::<IpAddr>().is_err() {
            return Err(ValidationError::InvalidServer(format!(
                "server_ip '{}' is not a valid IP address",
                self.server_ip
            )));
        }

        if self.port == 0 {
            return Err(ValidationError::InvalidServer(
                "port cannot be 0".to_string(),
            ));
        }

        if let Some(token) = &self.auth_token {
            if token.trim().is_empty() {
                return Err(ValidationError::InvalidServer(
                    "auth_token cannot be blank when present".to_string(),
                ));
            }
        }

        self.lifecycle.validate()
    }

    /// Address of the wallet manager server, e.g. "127.0.0.1:4000"
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_ip, self.port)
    }
}

impl LifecycleSettings {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.cli_attempts == 0 {
            return Err(ValidationError::InvalidLifecycle(
                "cli_attempts must be at least 1".to_string(),
            ));
        }
        if self.stop_max_polls == 0 {
            return Err(ValidationError::InvalidLifecycle(
                "stop_max_polls must be at least 1".to_string(),
            ));
        }
        if self.banner_line_limit == 0 {
            return Err(ValidationError::InvalidLifecycle(
                "banner_line_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid server configuration: {0}")]
    InvalidServer(String),
    #[error("Invalid lifecycle configuration: {0}")]
    InvalidLifecycle(String),
}
