//! Service configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `config/api.toml`, then `ASSETS__*` environment variables.

use assets::providers::RemoteProviderConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "config/api";
const ENV_PREFIX: &str = "ASSETS";

/// API service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Register the local media library as the default provider
    pub allow_local_media: bool,
    /// Upstream timeout for remote providers, in seconds
    pub http_timeout_secs: u64,
    /// RSA public key (PEM) or path to one
    #[serde(default)]
    pub jwt_public_key: Option<String>,
    /// Remote providers, registered in order after the local one
    #[serde(default)]
    pub providers: Vec<RemoteProviderConfig>,
}

impl ApiConfig {
    /// Load from `config/api.toml` and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file(DEFAULT_CONFIG_FILE)
    }

    /// Load from the given file (extension optional) and the environment
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:3001")?
            .set_default("allow_local_media", true)?
            .set_default("http_timeout_secs", 30)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
