//! Configuration for the switchboard runner.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Deployment stages a replica may run in.
pub const ALLOWED_STAGES: [&str; 3] = ["development", "testing", "production"];

/// Main configuration structure for the runner.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub replica: ReplicaConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub models: ModelsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplicaConfig {
    /// Base name of the deployment; the replica id is appended to it.
    #[serde(default = "default_replica_name")]
    pub name: String,
    /// One of [`ALLOWED_STAGES`].
    #[serde(default = "default_stage")]
    pub stage: String,
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            name: default_replica_name(),
            stage: default_stage(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where the model document lives.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ModelsConfig {
    /// Path to the YAML model document. Without it the replica starts empty.
    #[serde(default)]
    pub path: Option<String>,
}

// Default values
fn default_replica_name() -> String {
    "switchboard".to_string()
}
fn default_stage() -> String {
    "development".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (SWITCHBOARD__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> std::result::Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            // Set defaults
            .set_default("replica.name", default_replica_name())?
            .set_default("replica.stage", default_stage())?
            .set_default("api.host", default_host())?
            .set_default("api.port", default_port() as i64)?
            // Load from config.toml if exists
            .add_source(File::with_name("config").required(false))
            // Override with environment variables (SWITCHBOARD__SECTION__KEY format)
            .add_source(
                Environment::with_prefix("SWITCHBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject settings that deserialize but cannot be served.
    pub fn validate(&self) -> Result<()> {
        if !ALLOWED_STAGES.contains(&self.replica.stage.as_str()) {
            return Err(Error::Service(format!(
                "Stage {} not allowed, allowed stages are {:?}",
                self.replica.stage, ALLOWED_STAGES
            )));
        }
        if self.replica.name.trim().is_empty() {
            return Err(Error::Service("replica name must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_config() {
        let api = ApiConfig::default();
        assert_eq!(api.host, "0.0.0.0");
        assert_eq!(api.port, 8000);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.replica.stage, "development");
        assert!(config.models.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_stage_rejected() {
        let mut config = Config::default();
        config.replica.stage = "staging".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Stage staging not allowed"));

        config.replica.stage = "production".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let config: Config = ConfigLoader::builder()
            .add_source(File::from_str(
                "[models]\npath = \"models.yml\"\n[api]\nport = 9000\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.models.path.as_deref(), Some("models.yml"));
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.replica.name, "switchboard");
    }
}
