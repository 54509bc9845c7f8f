//! Configuration for the server.
//!
//! Values are read from a YAML file (`config.yaml` by default, `-f` to override) and then from
//! environment variables prefixed with `CHAPTERD_`. Nested keys are separated by a double
//! underscore:
//!
//! ```bash
//! CHAPTERD_PORT=9000
//! CHAPTERD_AUTH__SESSION_DURATION=12h
//! CHAPTERD_DATABASE__READ_ONLY=true
//! ```
//!
//! `DATABASE_URL` is honoured as well and takes precedence over `database.url`.

use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::auth::password::Argon2Params;
use crate::db::models::sessions::expiry_after;
use crate::errors::Error;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "CHAPTERD_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults, so an empty or missing file yields a working local setup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Set from the `DATABASE_URL` environment variable; moved into `database.url` on load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    pub database: DatabaseConfig,
    /// Username of the account created when the database is empty
    pub root_username: String,
    /// Password for that account. A random one is generated and logged when unset.
    pub root_password: Option<String>,
    pub auth: AuthConfig,
    /// How long open connections may keep running after a shutdown signal
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite connection string, e.g. `sqlite://chapterd.db`
    pub url: String,
    pub max_connections: u32,
    /// Open the database read-only. Writes fail; key authentication keeps working.
    pub read_only: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// How long a session stays valid after its last use
    #[serde(with = "humantime_serde")]
    pub session_duration: Duration,
    /// Hashing cost for stored passwords
    pub argon2: Argon2Params,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: None,
            database: DatabaseConfig::default(),
            root_username: "root".to_string(),
            root_password: None,
            auth: AuthConfig::default(),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://chapterd.db".to_string(),
            max_connections: 5,
            read_only: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_duration: Duration::from_secs(7 * 24 * 60 * 60),
            argon2: Argon2Params::default(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        if let Some(url) = config.database_url.take() {
            config.database.url = url;
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.auth.session_duration.is_zero() {
            return Err(Error::Internal {
                operation: "Config validation: auth.session_duration must be greater than zero".to_string(),
            });
        }

        if expiry_after(Utc::now(), self.auth.session_duration).is_none() {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: auth.session_duration of {} is too large",
                    humantime::format_duration(self.auth.session_duration)
                ),
            });
        }

        if self.database.max_connections == 0 {
            return Err(Error::Internal {
                operation: "Config validation: database.max_connections must be at least 1".to_string(),
            });
        }

        if self.root_username.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: root_username cannot be empty".to_string(),
            });
        }

        if self.root_password.as_deref() == Some("") {
            return Err(Error::Internal {
                operation: "Config validation: root_password cannot be empty; remove it to generate one".to_string(),
            });
        }

        self.auth.argon2.validate().map_err(|e| Error::Internal {
            operation: format!("Config validation: invalid auth.argon2 parameters: {e}"),
        })?;

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("CHAPTERD_").split("__").ignore(&["config"]))
            // Common DATABASE_URL pattern
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
