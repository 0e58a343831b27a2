// src/config.rs

//! Manages server configuration: defaults and optional file-based overrides.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// The server's runtime configuration. Every field has a default, so the
/// server runs without a configuration file at all.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    6379
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file. A missing file is not an
    /// error; defaults apply for it and for any omitted field.
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()?;
        let config = settings.try_deserialize()?;
        Ok(config)
    }
}
