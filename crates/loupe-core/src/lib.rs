//! # loupe-core
//!
//! Core types and result shaping for Loupe, a read-only document-database
//! lens for AI agents.
//!
//! This crate holds everything that is pure and stateless:
//!
//! - **Configuration** types loaded from `loupe.yaml` and the environment
//! - **`DocumentStore`** — the collaborator trait the MCP layer calls into
//! - **`PipelineGuard`** — the deny-list gate that keeps aggregation
//!   pipelines free of write-capable stages
//! - **Schema inference** — merged structural schemas from document samples
//! - **Tabular serialization** — CSV with header-union semantics
//! - **Visualization hints** — best-effort classification of result sets
//!
//! None of these components hold connections or cache state between calls;
//! they are plain transformations over their inputs.

pub mod config;
pub mod guard;
pub mod schema;
pub mod store;
pub mod tabular;
pub mod viz;

pub use config::{LoupeConfig, McpConfig, SafetyConfig, StoreConfig, Transport};
pub use guard::{GuardError, GuardErrorKind, PipelineGuard, DEFAULT_DENIED_STAGES};
pub use schema::{infer_schema, FieldSchema, SchemaMap};
pub use store::{
    CollectionSummary, DatabaseSummary, DocumentStore, FindQuery, GeoNearQuery, GeoPredicate,
    GeoShapeQuery, TextQuery,
};
pub use tabular::{to_csv, CsvOptions};
pub use viz::visualization_hints;
