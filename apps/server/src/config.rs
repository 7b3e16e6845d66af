//! Application configuration.

use lurker_engine::{Backoff, Thresholds};
use lurker_feeds::DEFAULT_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_PATH_VAR: &str = "LURKER_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    MissingVar(&'static str),
    #[error("Invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub monitor: MonitorSettings,
    pub thresholds: Thresholds,
    pub backoff: BackoffSettings,
    pub http: HttpSettings,
}

impl AppConfig {
    /// Load from the file named by `LURKER_CONFIG`, or use defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Polling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Seconds between polling cycles.
    pub interval_secs: u64,
    /// Accounts watched for view surges.
    pub accounts: Vec<String>,
    /// Influencer candidates checked for verification at startup.
    pub influencers: Vec<String>,
    /// Posts fetched per account; only the newest is compared.
    pub posts_per_account: u32,
    /// Influencer posts fetched per token.
    pub influencer_posts: u32,
}

impl MonitorSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval_secs: 120,
            accounts: vec![
                "elonmusk".to_string(),
                "PicturesFolder".to_string(),
                "Ga__ke".to_string(),
            ],
            influencers: vec![
                "Ga__ke".to_string(),
                "blknoiz06".to_string(),
                "kanyewest".to_string(),
                "shakira".to_string(),
                "_Shadow36".to_string(),
            ],
            posts_per_account: 5,
            influencer_posts: 10,
        }
    }
}

/// Rate-limit backoff settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffSettings {
    pub base_secs: u64,
    pub max_secs: u64,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            base_secs: 120,
            max_secs: 600,
        }
    }
}

impl From<&BackoffSettings> for Backoff {
    fn from(settings: &BackoffSettings) -> Self {
        Backoff::new(
            Duration::from_secs(settings.base_secs),
            Duration::from_secs(settings.max_secs),
        )
    }
}

/// HTTP client settings. Base URL overrides point the clients at other hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub x_base_url: Option<String>,
    pub etherscan_base_url: Option<String>,
    pub solscan_base_url: Option<String>,
    pub dexscreener_base_url: Option<String>,
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            x_base_url: None,
            etherscan_base_url: None,
            solscan_base_url: None,
            dexscreener_base_url: None,
        }
    }
}

/// Required secrets, in the order they are checked.
pub const REQUIRED_VARS: [&str; 8] = [
    "X_API_KEY",
    "X_API_SECRET",
    "X_ACCESS_TOKEN",
    "X_ACCESS_SECRET",
    "X_BEARER_TOKEN",
    "ETHERSCAN_API_KEY",
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_ALERT_CHAT_ID",
];

/// Secrets read from the environment.
#[derive(Clone)]
pub struct Credentials {
    pub x_api_key: String,
    pub x_api_secret: String,
    pub x_access_token: String,
    pub x_access_secret: String,
    pub x_bearer_token: String,
    pub etherscan_api_key: String,
    pub telegram_bot_token: String,
    pub telegram_alert_chat_id: i64,
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read every required variable through `lookup`. Fails on the first
    /// missing or blank one.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut values = Vec::with_capacity(REQUIRED_VARS.len());
        for name in REQUIRED_VARS {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => values.push(value.trim().to_string()),
                _ => return Err(ConfigError::MissingVar(name)),
            }
        }

        let chat_id = values[7].parse::<i64>().map_err(|_| ConfigError::InvalidVar {
            name: REQUIRED_VARS[7],
            value: values[7].clone(),
        })?;

        let mut values = values.into_iter();
        let mut next = || values.next().unwrap_or_default();
        Ok(Self {
            x_api_key: next(),
            x_api_secret: next(),
            x_access_token: next(),
            x_access_secret: next(),
            x_bearer_token: next(),
            etherscan_api_key: next(),
            telegram_bot_token: next(),
            telegram_alert_chat_id: chat_id,
        })
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("x_api_key", &redact(&self.x_api_key))
            .field("x_api_secret", &redact(&self.x_api_secret))
            .field("x_access_token", &redact(&self.x_access_token))
            .field("x_access_secret", &redact(&self.x_access_secret))
            .field("x_bearer_token", &redact(&self.x_bearer_token))
            .field("etherscan_api_key", &redact(&self.etherscan_api_key))
            .field("telegram_bot_token", &redact(&self.telegram_bot_token))
            .field("telegram_alert_chat_id", &self.telegram_alert_chat_id)
            .finish()
    }
}
