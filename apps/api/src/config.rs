//! # Server Configuration
//!
//! Configuration is read from environment variables, with a `.env` file
//! loaded first when present.
//!
//! ## Variables
//! ```text
//! ┌──────────────────────┬──────────┬──────────────────────────────────────┐
//! │ Variable             │ Default  │ Meaning                              │
//! ├──────────────────────┼──────────┼──────────────────────────────────────┤
//! │ APP_ENV              │ required │ development | production             │
//! │ DATABASE_URI         │ required │ SQLite database file                 │
//! │ SERVER_HOST          │ 0.0.0.0  │ bind address                         │
//! │ SERVER_PORT          │ 1323     │ bind port                            │
//! │ FRONTEND_URL         │ (none)   │ extra CORS origin                    │
//! │ DB_MAX_CONNECTIONS   │ 5        │ pool size                            │
//! │ REQUEST_TIMEOUT_SECS │ 10       │ deadline per storage call            │
//! │ SEED                 │ false    │ reseed on startup (development only) │
//! └──────────────────────┴──────────┴──────────────────────────────────────┘
//! ```

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Origin of the local frontend dev server, always allowed by CORS.
pub const LOCAL_FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Development,
    Production,
}

impl FromStr for RuntimeEnv {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(RuntimeEnv::Development),
            "production" => Ok(RuntimeEnv::Production),
            other => Err(ConfigError::InvalidValue {
                key: "APP_ENV".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for RuntimeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeEnv::Development => write!(f, "development"),
            RuntimeEnv::Production => write!(f, "production"),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: RuntimeEnv,

    /// SQLite database file path.
    pub database_uri: String,

    pub server_host: String,
    pub server_port: u16,

    /// Deployed frontend origin, allowed by CORS next to the local one.
    pub frontend_url: Option<String>,

    pub db_max_connections: u32,

    /// Deadline applied to every storage call made by a handler.
    pub request_timeout: Duration,

    /// Raw SEED flag; see [`AppConfig::should_seed`].
    pub seed: bool,
}

impl AppConfig {
    /// Loads configuration from the process environment (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from any key lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_env = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &str| get_env(key).ok_or_else(|| ConfigError::MissingRequired(key.to_string()));

        let env: RuntimeEnv = require("APP_ENV")?.parse()?;
        let database_uri = require("DATABASE_URI")?;

        let server_host = get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = parse_or("SERVER_PORT", get_env("SERVER_PORT"), 1323u16)?;
        let frontend_url = get_env("FRONTEND_URL");
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", get_env("DB_MAX_CONNECTIONS"), 5u32)?;
        let timeout_secs = parse_or("REQUEST_TIMEOUT_SECS", get_env("REQUEST_TIMEOUT_SECS"), 10u64)?;
        let seed = parse_or("SEED", get_env("SEED"), false)?;

        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DB_MAX_CONNECTIONS".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(AppConfig {
            env,
            database_uri,
            server_host,
            server_port,
            frontend_url,
            db_max_connections,
            request_timeout: Duration::from_secs(timeout_secs),
            seed,
        })
    }

    /// Configuration for tests: in-memory database, development mode.
    pub fn for_tests() -> Self {
        AppConfig {
            env: RuntimeEnv::Development,
            database_uri: ":memory:".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            frontend_url: None,
            db_max_connections: 1,
            request_timeout: Duration::from_secs(5),
            seed: false,
        }
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn is_production(&self) -> bool {
        self.env == RuntimeEnv::Production
    }

    /// Seeding is honored only in development.
    pub fn should_seed(&self) -> bool {
        self.seed && self.env == RuntimeEnv::Development
    }

    /// Origins allowed by CORS.
    pub fn allowed_origins(&self) -> Vec<&str> {
        let mut origins = vec![LOCAL_FRONTEND_ORIGIN];
        if let Some(url) = self.frontend_url.as_deref() {
            let url = url.trim_end_matches('/');
            if url != LOCAL_FRONTEND_ORIGIN {
                origins.push(url);
            }
        }
        origins
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}
