//! Configuration management for headtrack.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum_extra::extract::cookie::Key;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "headtrack";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "database.json";

/// Default credential file name.
const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Minimum length for a configured cookie secret.
const MIN_COOKIE_SECRET_LENGTH: usize = 32;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `HEADTRACK_`)
/// 2. TOML config file at `~/.config/headtrack/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_address: String,
    /// Port to listen on.
    pub port: u16,
    /// Secret used to sign session cookies.
    ///
    /// When unset a random key is generated at startup, so sessions don't
    /// survive a restart. Must be at least 32 bytes when set.
    pub cookie_secret: Option<String>,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the record database file.
    /// Defaults to `~/.local/share/headtrack/database.json`
    pub database_path: Option<PathBuf>,
    /// Path to the credential file.
    /// Defaults to `~/.local/share/headtrack/credentials.json`
    pub credentials_path: Option<PathBuf>,
}

/// Authentication configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Password the credential file is seeded with on first run.
    pub default_password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            cookie_secret: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_password: "ChangeMe@123".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `HEADTRACK_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("HEADTRACK_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        if self.server.bind_address.parse::<std::net::IpAddr>().is_err() {
            return Err(Error::ConfigValidation {
                message: format!(
                    "server.bind_address is not a valid IP address: {}",
                    self.server.bind_address
                ),
            });
        }

        if let Some(secret) = &self.server.cookie_secret {
            if secret.len() < MIN_COOKIE_SECRET_LENGTH {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "server.cookie_secret must be at least {MIN_COOKIE_SECRET_LENGTH} bytes"
                    ),
                });
            }
        }

        if self.auth.default_password.is_empty() {
            return Err(Error::ConfigValidation {
                message: "auth.default_password must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address/port don't parse.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.bind_address, self.server.port)
            .parse()
            .map_err(|_| Error::ConfigValidation {
                message: format!(
                    "invalid listen address {}:{}",
                    self.server.bind_address, self.server.port
                ),
            })
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the credential file path, resolving defaults if not set.
    #[must_use]
    pub fn credentials_path(&self) -> PathBuf {
        self.storage
            .credentials_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(CREDENTIALS_FILE_NAME))
    }

    /// Get the cookie-signing key.
    ///
    /// Derived from the configured secret when set; otherwise a random key,
    /// meaning sessions are invalidated by a restart.
    #[must_use]
    pub fn cookie_key(&self) -> Key {
        self.server
            .cookie_secret
            .as_ref()
            .map_or_else(Key::generate, |secret| Key::derive_from(secret.as_bytes()))
    }
}
