//! Error types for the MCP crate.

use thiserror::Error;

/// Errors that can occur in the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Invalid request (missing database, unsafe pipeline, bad geometry...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Tool not found.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// Invalid arguments for tool.
    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// The store call failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl McpError {
    /// JSON-RPC error code for this error.
    pub fn json_rpc_code(&self) -> i32 {
        match self {
            McpError::InvalidRequest(_)
            | McpError::ToolNotFound { .. }
            | McpError::InvalidArguments { .. } => -32602,
            McpError::Serialization(_) => -32700,
            _ => -32603,
        }
    }

    /// Whether this failure was caught before any store call was issued.
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            McpError::InvalidRequest(_) | McpError::InvalidArguments { .. }
        )
    }
}
