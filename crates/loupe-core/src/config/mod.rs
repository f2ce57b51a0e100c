//! Configuration types for Loupe.
//!
//! Configuration is loaded from a single YAML file (`loupe.yaml`) and can be
//! overridden piecemeal from the environment. The store section describes the
//! MongoDB deployment Loupe reads from; the mcp section selects the transport;
//! the safety section carries the aggregation deny-list.

pub mod mcp;
pub mod safety;
pub mod store;

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub use mcp::{McpConfig, Transport};
pub use safety::SafetyConfig;
pub use store::StoreConfig;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Complete Loupe configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoupeConfig {
    /// Project name, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Document store connection settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// MCP server settings.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Mutation safety settings.
    #[serde(default)]
    pub safety: SafetyConfig,
}

impl LoupeConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Apply environment overrides.
    ///
    /// `MONGODB_URI` replaces the connection URL and `LOUPE_DEFAULT_DATABASE`
    /// replaces the default database.
    pub fn apply_env(&mut self) {
        if let Ok(url) = env::var("MONGODB_URI") {
            if !url.is_empty() {
                tracing::debug!("Using connection URL from MONGODB_URI");
                self.store.url = url;
            }
        }
        if let Ok(db) = env::var("LOUPE_DEFAULT_DATABASE") {
            if !db.is_empty() {
                tracing::debug!(database = %db, "Using default database from environment");
                self.store.default_database = Some(db);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoupeConfig::default();
        assert_eq!(config.store.url, "mongodb://localhost:27017");
        assert!(config.store.default_database.is_none());
        assert_eq!(config.store.schema_sample_size, 100);
        assert!(config.mcp.is_stdio());
        assert!(config.safety.denied_stages.contains(&"$out".to_string()));
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
project: staging-lens
store:
  url: mongodb://db.internal:27017
  default_database: analytics
mcp:
  transport: http
  port: 4100
safety:
  denied_stages: ["$out", "$merge", "$customMutator"]
"#;
        let config = LoupeConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.project.as_deref(), Some("staging-lens"));
        assert_eq!(config.store.default_database.as_deref(), Some("analytics"));
        assert!(config.mcp.is_http());
        assert_eq!(config.mcp.port, 4100);
        assert_eq!(config.safety.denied_stages.len(), 3);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = LoupeConfig::from_yaml("store:\n  default_database: app\n").unwrap();
        assert_eq!(config.store.url, "mongodb://localhost:27017");
        assert_eq!(config.store.default_database.as_deref(), Some("app"));
        assert_eq!(config.safety.denied_stages.len(), 7);
    }
}
