//! Application configuration
//!
//! Loaded from an optional `trailsentry` config file plus
//! `TRAILSENTRY_`-prefixed environment variables, on top of built-in
//! defaults.

use detection::DetectorConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub detector: DetectorConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// HTTP port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database URL
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://trailsentry.db".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("trailsentry").required(false))
            .add_source(config::Environment::with_prefix("TRAILSENTRY").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert!(config.database.url.starts_with("sqlite:"));
        assert_eq!(config.detector.cycle_interval_secs, 60);
        assert_eq!(config.detector.error_backoff_secs, 30);
    }
}
