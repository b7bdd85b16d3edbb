//! Configuration loading and management.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server identity.
    pub server: ServerConfig,
    /// SASL relay configuration.
    #[serde(default)]
    pub sasl: SaslConfig,
}

/// Server identity information.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name (e.g., "irc.example.net").
    pub name: String,
    /// TS6 server ID, used as the origin of encapsulated messages.
    pub sid: String,
    /// Network name.
    #[serde(default)]
    pub network: String,
    /// Server description.
    #[serde(default)]
    pub description: String,
}

/// SASL relay configuration.
///
/// Resource limits are compile-time constants in [`crate::state::sasl`];
/// only the initially advertised mechanism list is configurable. Services
/// replace it at runtime via `MECHLIST`.
#[derive(Debug, Clone, Deserialize)]
pub struct SaslConfig {
    /// Mechanism list advertised before services report theirs.
    #[serde(default = "default_mechanisms")]
    pub mechanisms: String,
}

impl Default for SaslConfig {
    fn default() -> Self {
        Self {
            mechanisms: default_mechanisms(),
        }
    }
}

fn default_mechanisms() -> String {
    "PLAIN".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
