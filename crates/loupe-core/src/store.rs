//! The document store collaborator.
//!
//! The MCP layer never talks to a driver directly; it calls this trait, which
//! a thin adapter implements as pass-through driver calls. Validation and
//! result shaping happen entirely on the caller's side, so implementations
//! must not retry, reorder, or reshape beyond what the store itself returns.

use async_trait::async_trait;
use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

/// Descriptor for one database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_on_disk: Option<u64>,
}

/// Descriptor for one collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub name: String,
    /// "collection", "view", or "timeseries".
    #[serde(rename = "type")]
    pub collection_type: String,
}

/// Arguments for a filtered find.
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub filter: Document,
    pub projection: Option<Document>,
    pub sort: Option<Document>,
    pub limit: Option<i64>,
}

/// Arguments for a proximity query, executed as a `$geoNear` stage.
#[derive(Debug, Clone)]
pub struct GeoNearQuery {
    pub location_field: String,
    /// (longitude, latitude).
    pub center: (f64, f64),
    pub distance_field: String,
    pub spherical: bool,
    pub max_distance: Option<f64>,
    pub min_distance: Option<f64>,
    pub limit: Option<i64>,
    pub filter: Document,
}

/// Containment predicate for shape queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoPredicate {
    Within,
    Intersects,
}

/// Arguments for a shape query against a GeoJSON geometry.
#[derive(Debug, Clone)]
pub struct GeoShapeQuery {
    pub location_field: String,
    pub predicate: GeoPredicate,
    pub geometry: Document,
    pub filter: Document,
    pub limit: Option<i64>,
}

/// Arguments for a text-index search.
#[derive(Debug, Clone)]
pub struct TextQuery {
    pub search: String,
    pub filter: Document,
    pub include_score: bool,
    pub limit: Option<i64>,
}

/// Read-only operations against the document store.
///
/// Every method is a single round-trip; failures carry the store's original
/// message so the caller can classify them (missing index vs. generic).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_databases(&self) -> anyhow::Result<Vec<DatabaseSummary>>;

    async fn list_collections(&self, db: &str) -> anyhow::Result<Vec<CollectionSummary>>;

    async fn find(&self, db: &str, collection: &str, query: FindQuery)
        -> anyhow::Result<Vec<Document>>;

    /// Run an aggregation. Callers guarantee the pipeline has already passed
    /// the safety guard.
    async fn aggregate(
        &self,
        db: &str,
        collection: &str,
        pipeline: Vec<Document>,
        limit: Option<i64>,
    ) -> anyhow::Result<Vec<Document>>;

    async fn distinct(
        &self,
        db: &str,
        collection: &str,
        field: &str,
        filter: Document,
    ) -> anyhow::Result<Vec<Bson>>;

    /// Random sample of up to `size` documents.
    async fn sample(&self, db: &str, collection: &str, size: i64)
        -> anyhow::Result<Vec<Document>>;

    async fn count_documents(
        &self,
        db: &str,
        collection: &str,
        filter: Document,
    ) -> anyhow::Result<u64>;

    async fn collection_stats(&self, db: &str, collection: &str) -> anyhow::Result<Document>;

    async fn indexes(&self, db: &str, collection: &str) -> anyhow::Result<Vec<Document>>;

    /// Execution plan for a find, at the store's default verbosity.
    async fn explain(&self, db: &str, collection: &str, query: FindQuery)
        -> anyhow::Result<Document>;

    async fn geo_near(
        &self,
        db: &str,
        collection: &str,
        query: GeoNearQuery,
    ) -> anyhow::Result<Vec<Document>>;

    async fn geo_shape(
        &self,
        db: &str,
        collection: &str,
        query: GeoShapeQuery,
    ) -> anyhow::Result<Vec<Document>>;

    async fn text_search(
        &self,
        db: &str,
        collection: &str,
        query: TextQuery,
    ) -> anyhow::Result<Vec<Document>>;
}
