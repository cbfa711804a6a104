//! Environment-driven configuration.
//!
//! Server and client settings are read from environment variables with
//! defaults, the same way the binary always has. `from_lookup` takes any
//! key lookup so tests can supply values without touching the process env.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-secret-do-not-use-in-production-change-me-now";
const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required in production")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value.map(|v| v.to_lowercase()).as_deref() {
            Some("development") => AppEnv::Development,
            _ => AppEnv::Production,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, AppEnv::Development)
    }
}

/// Settings for the diagram API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub app_env: AppEnv,
    pub jwt_secret: String,
    /// Directory for the file storage backend; in-memory storage when unset.
    pub data_dir: Option<PathBuf>,
    /// Owner id used for every request when running the development bypass.
    pub dev_user: Option<String>,
    pub rate_limit_per_minute: u32,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                reason: format!("{raw:?} is not a port number"),
            })?,
            None => 8081,
        };

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) => secret,
            None if app_env.is_development() => {
                warn!("JWT_SECRET not set! Using default secret for development. DO NOT USE IN PRODUCTION!");
                DEV_JWT_SECRET.to_string()
            }
            None => return Err(ConfigError::Missing("JWT_SECRET")),
        };
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            if app_env.is_development() {
                warn!("JWT_SECRET is less than 32 characters. Consider using a longer secret.");
            } else {
                return Err(ConfigError::Invalid {
                    key: "JWT_SECRET",
                    reason: format!("must be at least {MIN_JWT_SECRET_LEN} characters"),
                });
            }
        }

        let dev_user = match lookup("AUTH_DEV_USER").filter(|u| !u.trim().is_empty()) {
            Some(user) if app_env.is_development() => Some(user),
            Some(_) => {
                warn!("AUTH_DEV_USER ignored outside APP_ENV=development");
                None
            }
            None => None,
        };

        let rate_limit_per_minute = match lookup("RATE_LIMIT_PER_MINUTE") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "RATE_LIMIT_PER_MINUTE",
                        reason: format!("{raw:?} is not a positive integer"),
                    });
                }
            },
            None => 100,
        };

        Ok(Self {
            port,
            app_env,
            jwt_secret,
            data_dir: lookup("DIAGRAM_DATA_DIR").map(PathBuf::from),
            dev_user,
            rate_limit_per_minute,
        })
    }

    /// Development configuration with a fixed secret, used by tests.
    pub fn for_tests(jwt_secret: impl Into<String>) -> Self {
        Self {
            port: 0,
            app_env: AppEnv::Development,
            jwt_secret: jwt_secret.into(),
            data_dir: None,
            dev_user: None,
            rate_limit_per_minute: 10_000,
        }
    }
}

/// Settings for [`crate::client::DiagramStoreClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081/api/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup("DIAGRAM_API_BASE_URL") {
            url::Url::parse(&base_url).map_err(|e| ConfigError::Invalid {
                key: "DIAGRAM_API_BASE_URL",
                reason: e.to_string(),
            })?;
            config.base_url = base_url;
        }
        if let Some(raw) = lookup("DIAGRAM_API_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                key: "DIAGRAM_API_TIMEOUT_SECS",
                reason: format!("{raw:?} is not a number of seconds"),
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// Settings for [`crate::sync::SyncEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Inactivity window after the last edit before an autosave is issued.
    pub debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(2000),
        }
    }
}
