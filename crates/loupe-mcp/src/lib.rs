//! # loupe-mcp
//!
//! MCP (Model Context Protocol) server implementation for Loupe.
//!
//! This crate exposes a document database as a fixed catalog of read-only
//! tools for AI agents to consume. It supports:
//!
//! - **Read-Only Catalog**: Fourteen inspection and query tools, no mutations
//! - **Pipeline Safety**: Aggregation pipelines are screened before execution
//! - **Schema Inference**: Collections are summarized from a document sample
//! - **Multiple Transports**: stdio and HTTP
//! - **Shaped Output**: Pretty JSON with visualization hints, or CSV
//!
//! ## Architecture
//!
//! ```text
//! AI Agent (Claude, GPT, etc.)
//!       │
//!       │ MCP protocol (list tools / call tool)
//!       ▼
//! ┌──────────────────┐
//! │ Loupe MCP Server │
//! │  1. Resolve      │  ← call argument or configured default
//! │     database     │
//! │  2. Normalize    │
//! │     arguments    │
//! │  3. Screen       │  ← pipeline deny list
//! │     pipelines    │
//! │  4. Query store  │
//! │  5. Shape result │  ← JSON + hints, or CSV
//! └────────┬─────────┘
//!          │
//!          ▼
//!    Document store
//! ```
//!
//! ## Example Usage
//!
//! ```ignore
//! use loupe_core::LoupeConfig;
//! use loupe_mcp::McpServer;
//! use std::sync::Arc;
//!
//! let config = LoupeConfig::from_file("loupe.yaml")?;
//! let store = Arc::new(loupe_adapter_mongo::MongoStore::new(&config.store));
//!
//! let server = McpServer::new(config, store);
//! server.run().await?;
//! ```

pub mod catalog;
pub mod error;
pub mod executor;
pub mod http_transport;
pub mod protocol;
pub mod server;
pub mod tools;

// Re-export main types
pub use catalog::builtin_tools;
pub use error::McpError;
pub use executor::{ExecutionResult, ToolExecutor};
pub use protocol::{
    CallToolParams, JsonRpcRequest, JsonRpcResponse, ToolAnnotations, ToolContent, ToolDefinition,
};
pub use server::McpServer;
pub use tools::ToolRegistry;
