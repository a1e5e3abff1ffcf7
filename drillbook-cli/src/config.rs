//! Configuration file and settings resolution
//!
//! Values come from, highest first: command-line flags, environment
//! (`DATABASE_URL`, `DRILLBOOK_BIND`, with `.env` loaded beforehand),
//! `~/.drillbook/config.toml`, then built-in defaults.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:3030"
//! cors_permissive = false
//!
//! [database]
//! url = "postgres://localhost/drillbook"
//! max_connections = 5
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use drillbook_server::db::pool::DEFAULT_MAX_CONNECTIONS;
use drillbook_server::ServerConfig;

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub bind: Option<SocketAddr>,
    pub cors_permissive: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
}

impl FileConfig {
    /// Get config file path: ~/.drillbook/config.toml
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".drillbook/config.toml")
    }

    /// Load the config file.
    ///
    /// An explicit path must exist; the default path is skipped when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::default_path();
                if !path.exists() {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid TOML")
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<SocketAddr>,
    pub cors_permissive: bool,
    pub database_url: Option<String>,
    pub max_connections: Option<u32>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
    pub server: ServerConfig,
}

impl Settings {
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<Self> {
        let defaults = ServerConfig::default();

        let database_url = overrides.database_url.or(file.database.url).context(
            "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, .env, \
             or [database] url in ~/.drillbook/config.toml",
        )?;

        Ok(Self {
            database_url,
            max_connections: overrides
                .max_connections
                .or(file.database.max_connections)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            server: ServerConfig {
                bind_addr: overrides
                    .bind
                    .or(file.server.bind)
                    .unwrap_or(defaults.bind_addr),
                cors_permissive: overrides.cors_permissive
                    || file.server.cors_permissive.unwrap_or(defaults.cors_permissive),
            },
        })
    }
}
