//! Client configuration, read from environment variables.
//!
//! `load_dotenv_from_repo_root()` should run first so `.env.local` / `.env`
//! values are visible.
//!
//! # Environment Variables
//!
//! - `CODEPICS_BACKEND_URL` - Game server base URL (default: `http://localhost:5000/`)
//! - `CODEPICS_DEV_MODE` - Log every socket event (default: on in debug builds)
//! - `CODEPICS_RECONNECT` - Reconnect after a lost connection (default: true)
//! - `CODEPICS_RECONNECT_ATTEMPTS` - Attempts before giving up (default: 10)
//! - `CODEPICS_ROUTE` - Route the runner opens (default: `/`)
//! - `CODEPICS_PLAYER_NAME` - Name used when joining a lobby (default: `player`)

use std::str::FromStr;

use url::Url;

use crate::infrastructure::websocket::ReconnectPolicy;
use crate::routes::Route;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000/";
pub const DEFAULT_PLAYER_NAME: &str = "player";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid backend URL `{value}`: {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Where the client connects and how it behaves.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL for both the HTTP endpoints and the socket
    pub backend_url: Url,
    /// Log every inbound and outbound socket event
    pub dev_mode: bool,
    pub reconnect: ReconnectPolicy,
}

impl ClientConfig {
    pub fn new(backend_url: Url) -> Self {
        Self {
            backend_url,
            dev_mode: cfg!(debug_assertions),
            reconnect: ReconnectPolicy::default(),
        }
    }

    pub fn parse(backend_url: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(parse_backend_url(backend_url)?))
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend_url = lookup("CODEPICS_BACKEND_URL")
            .map(|value| parse_backend_url(&value))
            .transpose()?
            .map(Self::new);
        let mut config = match backend_url {
            Some(config) => config,
            None => Self::parse(DEFAULT_BACKEND_URL)?,
        };

        if let Some(dev_mode) = lookup_parsed(&lookup, "CODEPICS_DEV_MODE", parse_flag)? {
            config.dev_mode = dev_mode;
        }

        let mut policy = ReconnectPolicy::default();
        if let Some(enabled) = lookup_parsed(&lookup, "CODEPICS_RECONNECT", parse_flag)? {
            policy.enabled = enabled;
        }
        if let Some(attempts) =
            lookup_parsed(&lookup, "CODEPICS_RECONNECT_ATTEMPTS", |v| u32::from_str(v).ok())?
        {
            policy = policy.with_max_attempts(attempts);
        }
        config.reconnect = policy;

        Ok(config)
    }
}

/// Everything the headless runner needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    pub client: ClientConfig,
    pub route: Route,
    pub player_name: String,
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let client = ClientConfig::from_lookup(&lookup)?;
        let route = lookup_parsed(&lookup, "CODEPICS_ROUTE", |v| v.parse::<Route>().ok())?
            .unwrap_or_default();
        let player_name = lookup("CODEPICS_PLAYER_NAME")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PLAYER_NAME.to_string());

        Ok(Self {
            client,
            route,
            player_name,
        })
    }
}

/// Load `.env.local` then `.env` from the workspace root, if present.
///
/// Values already set in the process environment win.
pub fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn parse_backend_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::InvalidUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl {
            value: value.to_string(),
            reason: format!("expected http or https, got `{other}`"),
        }),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Blank values count as unset.
fn lookup_parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError> {
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(None),
        Some(value) => parse(value.trim())
            .map(Some)
            .ok_or(ConfigError::InvalidValue { key, value }),
    }
}
