//! Mutation safety configuration.
//!
//! The aggregation deny-list ships as configuration data rather than code so
//! new unsafe stage operators can be blocked without touching guard logic.

use crate::guard::DEFAULT_DENIED_STAGES;
use serde::{Deserialize, Serialize};

/// Safety settings applied before queries reach the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Aggregation stage operators that are never allowed to execute.
    #[serde(default = "default_denied_stages")]
    pub denied_stages: Vec<String>,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            denied_stages: default_denied_stages(),
        }
    }
}

fn default_denied_stages() -> Vec<String> {
    DEFAULT_DENIED_STAGES.iter().map(|s| s.to_string()).collect()
}
