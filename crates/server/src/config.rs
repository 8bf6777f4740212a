//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use co2_core::config::DEFAULT_MODEL_PATH;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("PORT must be a valid number, got '{0}'")]
    InvalidPort(String),

    #[error("Invalid HOST:PORT configuration '{0}'")]
    InvalidAddress(String),
}

/// Listen address and model location.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl ServerConfig {
    /// Read `HOST`, `PORT` and `MODEL_PATH` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
        })
    }

    /// Socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidAddress(raw))
    }
}
