use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::api::SecurityConfig;

/// Default port for the HTTP API.
pub const DEFAULT_PORT: u16 = 3001;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the collection documents (WORKSHOP_DATA_DIR, default `./data`)
    pub data_dir: PathBuf,
    /// Bind address (WORKSHOP_HOST, default `0.0.0.0`)
    pub host: String,
    /// Bind port (PORT, default 3001)
    pub port: u16,
    pub security: SecurityConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let data_dir = match std::env::var_os("WORKSHOP_DATA_DIR") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => std::env::current_dir()
                .context("Could not determine working directory")?
                .join("data"),
        };

        let port = match std::env::var("PORT") {
            Ok(port) => port
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            data_dir,
            host: std::env::var("WORKSHOP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            security: SecurityConfig::from_env(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
