use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::error::Result;

pub const DEFAULT_CONFIG_FILE: &str = "csvbridge.toml";
pub const CONFIG_PATH_ENV: &str = "CSVBRIDGE_CONFIG";
pub const ENV_PREFIX: &str = "CSVBRIDGE_";

/// How the process serves requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Long-running HTTP server
    Server,
    /// One request from stdin, one response to stdout
    Oneshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    pub host: String,

    #[validate(range(min = 1))]
    pub port: u16,

    /// Largest accepted JSON request body
    #[validate(range(min = 1))]
    pub max_payload_bytes: usize,

    pub permissive_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            max_payload_bytes: 16 * 1024 * 1024,
            permissive_cors: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FetchConfig {
    /// Request timeout; the HTTP client default applies when unset
    #[validate(range(min = 1))]
    pub timeout_secs: Option<u64>,

    #[validate(length(min = 1))]
    pub user_agent: String,

    /// Largest accepted remote CSV body
    #[validate(range(min = 1))]
    pub max_body_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: concat!("csvbridge/", env!("CARGO_PKG_VERSION")).to_string(),
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    pub mode: RunMode,

    /// tracing filter used when RUST_LOG is not set
    #[validate(length(min = 1))]
    pub log_filter: String,

    #[validate(nested)]
    pub server: ServerConfig,

    #[validate(nested)]
    pub fetch: FetchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Server,
            log_filter: "info".to_string(),
            server: ServerConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load defaults, then the TOML file, then `CSVBRIDGE_*` variables
    pub fn load() -> Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_figment(Self::figment(&path))
    }

    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }
}
