//! Document store connection configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the upstream document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Connection URL for the MongoDB deployment.
    #[serde(default = "default_url")]
    pub url: String,

    /// Database used when a tool call does not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_database: Option<String>,

    /// Number of documents sampled for schema inference.
    #[serde(default = "default_schema_sample_size")]
    pub schema_sample_size: i64,

    /// Document limit applied to queries that do not request one.
    #[serde(default = "default_limit")]
    pub default_limit: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            default_database: None,
            schema_sample_size: default_schema_sample_size(),
            default_limit: default_limit(),
        }
    }
}

fn default_url() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_schema_sample_size() -> i64 {
    100
}

fn default_limit() -> i64 {
    100
}
