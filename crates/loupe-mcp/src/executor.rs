//! Tool execution engine.
//!
//! The executor routes a named tool call through the fixed sequence the
//! server guarantees: normalize arguments, run safety validation, issue the
//! store call, shape the result. All validation happens before the store is
//! touched; once a store call has been issued its failure is classified
//! (missing index vs. generic) and surfaced, never retried.

use crate::error::McpError;
use crate::protocol::ToolContent;
use bson::{doc, Bson, Document};
use loupe_core::{
    infer_schema, to_csv, visualization_hints, CsvOptions, DocumentStore, FindQuery, GeoNearQuery,
    GeoPredicate, GeoShapeQuery, LoupeConfig, PipelineGuard, TextQuery,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Result of a tool execution.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Whether the execution was successful.
    pub success: bool,
    /// The result content blocks.
    pub content: Vec<ToolContent>,
    /// Error message if failed.
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Create a successful result with a single text payload.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            success: true,
            content: vec![ToolContent::Text { text: text.into() }],
            error: None,
        }
    }

    /// Create a successful result with a payload plus a hint block.
    fn with_hints(payload: String, hints: String) -> Self {
        let mut content = vec![ToolContent::Text { text: payload }];
        if !hints.is_empty() {
            content.push(ToolContent::Text { text: hints });
        }
        Self {
            success: true,
            content,
            error: None,
        }
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        let msg = message.into();
        Self {
            success: false,
            content: vec![ToolContent::Text { text: msg.clone() }],
            error: Some(msg),
        }
    }
}

// =============================================================================
// PER-TOOL ARGUMENTS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum OutputFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Deserialize)]
struct DatabaseArgs {
    #[serde(default)]
    database: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SchemaArgs {
    #[serde(default)]
    database: Option<String>,
    collection: String,
    #[serde(default)]
    sample_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    #[serde(default)]
    database: Option<String>,
    collection: String,
    #[serde(default)]
    filter: Option<Value>,
    #[serde(default)]
    projection: Option<Value>,
    #[serde(default)]
    sort: Option<Value>,
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default)]
    format: OutputFormat,
    #[serde(default)]
    delimiter: Option<String>,
    #[serde(default)]
    include_headers: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct AggregateArgs {
    #[serde(default)]
    database: Option<String>,
    collection: String,
    pipeline: Value,
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CountArgs {
    #[serde(default)]
    database: Option<String>,
    collection: String,
    #[serde(default)]
    filter: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct DistinctArgs {
    #[serde(default)]
    database: Option<String>,
    collection: String,
    field: String,
    #[serde(default)]
    filter: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SampleArgs {
    #[serde(default)]
    database: Option<String>,
    collection: String,
    #[serde(default = "default_sample_size")]
    size: i64,
    #[serde(default)]
    format: OutputFormat,
    #[serde(default)]
    delimiter: Option<String>,
    #[serde(default)]
    include_headers: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct CollectionArgs {
    #[serde(default)]
    database: Option<String>,
    collection: String,
}

#[derive(Debug, Deserialize)]
struct ExplainArgs {
    #[serde(default)]
    database: Option<String>,
    collection: String,
    #[serde(default)]
    filter: Option<Value>,
    #[serde(default)]
    projection: Option<Value>,
    #[serde(default)]
    sort: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct FindByIdsArgs {
    #[serde(default)]
    database: Option<String>,
    collection: String,
    ids: Value,
    #[serde(default = "default_id_field")]
    field: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum GeoMode {
    Near,
    Within,
    Intersects,
}

#[derive(Debug, Deserialize)]
struct GeoArgs {
    #[serde(default)]
    database: Option<String>,
    collection: String,
    location_field: String,
    mode: GeoMode,
    #[serde(default)]
    center: Option<Value>,
    #[serde(default)]
    geometry: Option<Value>,
    #[serde(default)]
    max_distance: Option<f64>,
    #[serde(default)]
    min_distance: Option<f64>,
    #[serde(default)]
    distance_field: Option<String>,
    #[serde(default)]
    spherical: Option<bool>,
    #[serde(default)]
    filter: Option<Value>,
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TextSearchArgs {
    #[serde(default)]
    database: Option<String>,
    collection: String,
    search: String,
    #[serde(default)]
    filter: Option<Value>,
    #[serde(default)]
    include_score: bool,
    #[serde(default)]
    limit: Option<i64>,
}

fn default_sample_size() -> i64 {
    10
}

fn default_id_field() -> String {
    "_id".to_string()
}

// =============================================================================
// EXECUTOR
// =============================================================================

/// Routes tool calls to the store and shapes the results.
#[derive(Clone)]
pub struct ToolExecutor {
    /// The store collaborator; the single shared connection lives behind it.
    store: Arc<dyn DocumentStore>,
    /// Database used when a call does not name one.
    default_database: Option<String>,
    /// Aggregation safety gate.
    guard: PipelineGuard,
    /// Sample size for schema inference.
    schema_sample_size: i64,
    /// Limit applied to queries that do not request one.
    default_limit: i64,
}

impl ToolExecutor {
    /// Create an executor over a store with the given configuration.
    pub fn new(store: Arc<dyn DocumentStore>, config: &LoupeConfig) -> Self {
        Self {
            store,
            default_database: config.store.default_database.clone(),
            guard: PipelineGuard::new(config.safety.denied_stages.iter().cloned()),
            schema_sample_size: config.store.schema_sample_size,
            default_limit: config.store.default_limit,
        }
    }

    /// Execute a tool call, mapping any failure into an error result.
    pub async fn execute(&self, name: &str, arguments: Value) -> ExecutionResult {
        match self.run_tool(name, arguments).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "tool call failed");
                ExecutionResult::error(e.to_string())
            }
        }
    }

    async fn run_tool(&self, name: &str, arguments: Value) -> Result<ExecutionResult, McpError> {
        // Absent arguments deserialize like an empty object.
        let arguments = if arguments.is_null() {
            json!({})
        } else {
            arguments
        };

        match name {
            "list_databases" => self.list_databases().await,
            "list_collections" => self.list_collections(arguments).await,
            "collection_schema" => self.collection_schema(arguments).await,
            "query" => self.query(arguments).await,
            "aggregate" => self.aggregate(arguments).await,
            "count_documents" => self.count_documents(arguments).await,
            "distinct_values" => self.distinct_values(arguments).await,
            "sample_data" => self.sample_data(arguments).await,
            "collection_stats" => self.collection_stats(arguments).await,
            "list_indexes" => self.list_indexes(arguments).await,
            "explain_query" => self.explain_query(arguments).await,
            "find_by_ids" => self.find_by_ids(arguments).await,
            "geo_query" => self.geo_query(arguments).await,
            "text_search" => self.text_search(arguments).await,
            _ => Err(McpError::ToolNotFound {
                name: name.to_string(),
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    async fn list_databases(&self) -> Result<ExecutionResult, McpError> {
        let databases = self
            .store
            .list_databases()
            .await
            .map_err(|e| classify_store_error("", e))?;
        Ok(ExecutionResult::text(pretty(&serde_json::to_value(
            &databases,
        )?)?))
    }

    async fn list_collections(&self, arguments: Value) -> Result<ExecutionResult, McpError> {
        let args: DatabaseArgs = parse_args("list_collections", arguments)?;
        let db = self.resolve_database(args.database)?;

        let collections = self
            .store
            .list_collections(&db)
            .await
            .map_err(|e| classify_store_error("", e))?;
        Ok(ExecutionResult::text(pretty(&serde_json::to_value(
            &collections,
        )?)?))
    }

    async fn collection_schema(&self, arguments: Value) -> Result<ExecutionResult, McpError> {
        let args: SchemaArgs = parse_args("collection_schema", arguments)?;
        let db = self.resolve_database(args.database)?;
        let size = args.sample_size.unwrap_or(self.schema_sample_size);

        let sample = self
            .store
            .sample(&db, &args.collection, size)
            .await
            .map_err(|e| classify_store_error(&args.collection, e))?;

        if sample.is_empty() {
            return Ok(ExecutionResult::text(format!(
                "No documents found in collection '{}'.",
                args.collection
            )));
        }

        let schema = infer_schema(&sample);
        Ok(ExecutionResult::text(pretty(&serde_json::to_value(
            &schema,
        )?)?))
    }

    async fn query(&self, arguments: Value) -> Result<ExecutionResult, McpError> {
        let args: QueryArgs = parse_args("query", arguments)?;
        let db = self.resolve_database(args.database)?;
        let csv_options = csv_options("query", args.delimiter, args.include_headers)?;

        let query = FindQuery {
            filter: to_filter("query", args.filter)?,
            projection: to_optional_document("query", "projection", args.projection)?,
            sort: to_optional_document("query", "sort", args.sort)?,
            limit: Some(args.limit.unwrap_or(self.default_limit)),
        };

        let documents = self
            .store
            .find(&db, &args.collection, query)
            .await
            .map_err(|e| classify_store_error(&args.collection, e))?;

        shape_result_set(documents, args.format, &csv_options)
    }

    async fn aggregate(&self, arguments: Value) -> Result<ExecutionResult, McpError> {
        let args: AggregateArgs = parse_args("aggregate", arguments)?;
        let db = self.resolve_database(args.database)?;

        // The guard must pass before any stage reaches the store.
        let stages = self
            .guard
            .check(&args.pipeline)
            .map_err(|e| McpError::InvalidRequest(e.message))?;

        let documents = self
            .store
            .aggregate(&db, &args.collection, stages, args.limit)
            .await
            .map_err(|e| classify_store_error(&args.collection, e))?;

        shape_result_set(documents, OutputFormat::Json, &CsvOptions::default())
    }

    async fn count_documents(&self, arguments: Value) -> Result<ExecutionResult, McpError> {
        let args: CountArgs = parse_args("count_documents", arguments)?;
        let db = self.resolve_database(args.database)?;
        let filter = to_filter("count_documents", args.filter)?;

        let count = self
            .store
            .count_documents(&db, &args.collection, filter)
            .await
            .map_err(|e| classify_store_error(&args.collection, e))?;

        Ok(ExecutionResult::text(pretty(&json!({ "count": count }))?))
    }

    async fn distinct_values(&self, arguments: Value) -> Result<ExecutionResult, McpError> {
        let args: DistinctArgs = parse_args("distinct_values", arguments)?;
        let db = self.resolve_database(args.database)?;
        let filter = to_filter("distinct_values", args.filter)?;

        let values = self
            .store
            .distinct(&db, &args.collection, &args.field, filter)
            .await
            .map_err(|e| classify_store_error(&args.collection, e))?;

        let values: Vec<Value> = values
            .into_iter()
            .map(Bson::into_relaxed_extjson)
            .collect();
        Ok(ExecutionResult::text(pretty(&json!({
            "field": args.field,
            "count": values.len(),
            "values": values,
        }))?))
    }

    async fn sample_data(&self, arguments: Value) -> Result<ExecutionResult, McpError> {
        let args: SampleArgs = parse_args("sample_data", arguments)?;
        let db = self.resolve_database(args.database)?;
        let csv_options = csv_options("sample_data", args.delimiter, args.include_headers)?;

        let documents = self
            .store
            .sample(&db, &args.collection, args.size)
            .await
            .map_err(|e| classify_store_error(&args.collection, e))?;

        shape_result_set(documents, args.format, &csv_options)
    }

    async fn collection_stats(&self, arguments: Value) -> Result<ExecutionResult, McpError> {
        let args: CollectionArgs = parse_args("collection_stats", arguments)?;
        let db = self.resolve_database(args.database)?;

        let stats = self
            .store
            .collection_stats(&db, &args.collection)
            .await
            .map_err(|e| classify_store_error(&args.collection, e))?;

        Ok(ExecutionResult::text(pretty(
            &Bson::Document(stats).into_relaxed_extjson(),
        )?))
    }

    async fn list_indexes(&self, arguments: Value) -> Result<ExecutionResult, McpError> {
        let args: CollectionArgs = parse_args("list_indexes", arguments)?;
        let db = self.resolve_database(args.database)?;

        let indexes = self
            .store
            .indexes(&db, &args.collection)
            .await
            .map_err(|e| classify_store_error(&args.collection, e))?;

        Ok(ExecutionResult::text(pretty(&documents_to_json(&indexes))?))
    }

    async fn explain_query(&self, arguments: Value) -> Result<ExecutionResult, McpError> {
        let args: ExplainArgs = parse_args("explain_query", arguments)?;
        let db = self.resolve_database(args.database)?;

        let query = FindQuery {
            filter: to_filter("explain_query", args.filter)?,
            projection: to_optional_document("explain_query", "projection", args.projection)?,
            sort: to_optional_document("explain_query", "sort", args.sort)?,
            limit: None,
        };

        let plan = self
            .store
            .explain(&db, &args.collection, query)
            .await
            .map_err(|e| classify_store_error(&args.collection, e))?;

        Ok(ExecutionResult::text(pretty(
            &Bson::Document(plan).into_relaxed_extjson(),
        )?))
    }

    async fn find_by_ids(&self, arguments: Value) -> Result<ExecutionResult, McpError> {
        let args: FindByIdsArgs = parse_args("find_by_ids", arguments)?;
        let db = self.resolve_database(args.database)?;

        let ids = args
            .ids
            .as_array()
            .filter(|ids| !ids.is_empty())
            .ok_or_else(|| {
                McpError::InvalidRequest("'ids' must be a non-empty array of id values".to_string())
            })?;
        let ids: Vec<Bson> = ids.iter().map(coerce_id).collect();

        let query = FindQuery {
            filter: doc! { &args.field: { "$in": ids } },
            limit: Some(self.default_limit),
            ..FindQuery::default()
        };

        let documents = self
            .store
            .find(&db, &args.collection, query)
            .await
            .map_err(|e| classify_store_error(&args.collection, e))?;

        shape_result_set(documents, OutputFormat::Json, &CsvOptions::default())
    }

    async fn geo_query(&self, arguments: Value) -> Result<ExecutionResult, McpError> {
        let args: GeoArgs = parse_args("geo_query", arguments)?;
        let db = self.resolve_database(args.database)?;
        let filter = to_filter("geo_query", args.filter)?;

        let documents = match args.mode {
            GeoMode::Near => {
                let center = parse_center(args.center)?;
                let query = GeoNearQuery {
                    location_field: args.location_field,
                    center,
                    distance_field: args
                        .distance_field
                        .unwrap_or_else(|| "distance".to_string()),
                    spherical: args.spherical.unwrap_or(true),
                    max_distance: args.max_distance,
                    min_distance: args.min_distance,
                    limit: args.limit,
                    filter,
                };
                self.store.geo_near(&db, &args.collection, query).await
            }
            GeoMode::Within | GeoMode::Intersects => {
                let geometry = parse_geometry(args.geometry)?;
                let predicate = if args.mode == GeoMode::Within {
                    GeoPredicate::Within
                } else {
                    GeoPredicate::Intersects
                };
                let query = GeoShapeQuery {
                    location_field: args.location_field,
                    predicate,
                    geometry,
                    filter,
                    limit: args.limit,
                };
                self.store.geo_shape(&db, &args.collection, query).await
            }
        }
        .map_err(|e| classify_store_error(&args.collection, e))?;

        shape_result_set(documents, OutputFormat::Json, &CsvOptions::default())
    }

    async fn text_search(&self, arguments: Value) -> Result<ExecutionResult, McpError> {
        let args: TextSearchArgs = parse_args("text_search", arguments)?;
        let db = self.resolve_database(args.database)?;

        if args.search.trim().is_empty() {
            return Err(McpError::InvalidRequest(
                "'search' must be a non-empty string".to_string(),
            ));
        }

        let query = TextQuery {
            search: args.search,
            filter: to_filter("text_search", args.filter)?,
            include_score: args.include_score,
            limit: args.limit,
        };

        let documents = self
            .store
            .text_search(&db, &args.collection, query)
            .await
            .map_err(|e| classify_store_error(&args.collection, e))?;

        shape_result_set(documents, OutputFormat::Json, &CsvOptions::default())
    }

    // -------------------------------------------------------------------------
    // Normalization
    // -------------------------------------------------------------------------

    /// Resolve the effective database: call argument, then configured
    /// default. Runs before anything else in every collection operation.
    fn resolve_database(&self, requested: Option<String>) -> Result<String, McpError> {
        requested
            .or_else(|| self.default_database.clone())
            .ok_or_else(|| {
                McpError::InvalidRequest(
                    "no database selected: pass a 'database' argument or configure a default \
                     database"
                        .to_string(),
                )
            })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, McpError> {
    serde_json::from_value(arguments).map_err(|e| McpError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

/// An absent filter matches everything.
fn to_filter(tool: &str, value: Option<Value>) -> Result<Document, McpError> {
    Ok(to_optional_document(tool, "filter", value)?.unwrap_or_default())
}

fn to_optional_document(
    tool: &str,
    field: &str,
    value: Option<Value>,
) -> Result<Option<Document>, McpError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) if v.is_object() => {
            bson::to_document(&v)
                .map(Some)
                .map_err(|e| McpError::InvalidArguments {
                    tool: tool.to_string(),
                    reason: format!("'{}' is not a valid document: {}", field, e),
                })
        }
        Some(_) => Err(McpError::InvalidArguments {
            tool: tool.to_string(),
            reason: format!("'{}' must be an object", field),
        }),
    }
}

fn csv_options(
    tool: &str,
    delimiter: Option<String>,
    include_headers: Option<bool>,
) -> Result<CsvOptions, McpError> {
    let mut options = CsvOptions::default();
    if let Some(d) = delimiter {
        let mut chars = d.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => options.delimiter = c,
            _ => {
                return Err(McpError::InvalidArguments {
                    tool: tool.to_string(),
                    reason: "'delimiter' must be a single character".to_string(),
                });
            }
        }
    }
    if let Some(h) = include_headers {
        options.include_headers = h;
    }
    Ok(options)
}

/// Shape a result set into content blocks: CSV text, or pretty JSON plus a
/// visualization-hint block when the heuristics produce one.
fn shape_result_set(
    documents: Vec<Document>,
    format: OutputFormat,
    csv: &CsvOptions,
) -> Result<ExecutionResult, McpError> {
    match format {
        OutputFormat::Csv => Ok(ExecutionResult::text(to_csv(&documents, csv))),
        OutputFormat::Json => {
            let payload = pretty(&documents_to_json(&documents))?;
            let hints = visualization_hints(&documents);
            Ok(ExecutionResult::with_hints(payload, hints))
        }
    }
}

fn documents_to_json(documents: &[Document]) -> Value {
    Value::Array(
        documents
            .iter()
            .map(|doc| Bson::Document(doc.clone()).into_relaxed_extjson())
            .collect(),
    )
}

fn pretty(value: &Value) -> Result<String, McpError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// 24-hex strings become ObjectIds; everything else matches as given.
fn coerce_id(value: &Value) -> Bson {
    if let Some(s) = value.as_str() {
        if let Ok(oid) = bson::oid::ObjectId::parse_str(s) {
            return Bson::ObjectId(oid);
        }
    }
    bson::to_bson(value).unwrap_or(Bson::Null)
}

fn parse_center(center: Option<Value>) -> Result<(f64, f64), McpError> {
    let invalid = || {
        McpError::InvalidRequest(
            "mode 'near' requires 'center' as a [longitude, latitude] numeric pair".to_string(),
        )
    };
    let value = center.ok_or_else(invalid)?;
    let pair = value.as_array().ok_or_else(invalid)?;
    if pair.len() != 2 {
        return Err(invalid());
    }
    let longitude = pair[0].as_f64().ok_or_else(invalid)?;
    let latitude = pair[1].as_f64().ok_or_else(invalid)?;
    Ok((longitude, latitude))
}

fn parse_geometry(geometry: Option<Value>) -> Result<Document, McpError> {
    let invalid = || {
        McpError::InvalidRequest(
            "modes 'within' and 'intersects' require 'geometry' as a GeoJSON object with 'type' \
             and 'coordinates'"
                .to_string(),
        )
    };
    let value = geometry.ok_or_else(invalid)?;
    let object = value.as_object().ok_or_else(invalid)?;
    if !object.get("type").is_some_and(Value::is_string) || !object.contains_key("coordinates") {
        return Err(invalid());
    }
    bson::to_document(&value).map_err(|_| invalid())
}

/// Classify a store failure. Messages pointing at a missing geospatial or
/// text index become actionable invalid-request errors; everything else is
/// wrapped with the original message intact.
fn classify_store_error(collection: &str, error: anyhow::Error) -> McpError {
    let message = format!("{:#}", error);
    let lower = message.to_lowercase();

    if lower.contains("2dsphere") || lower.contains("geonear") || lower.contains("2d index") {
        McpError::InvalidRequest(format!(
            "collection '{}' has no geospatial index; create a 2dsphere index on the location \
             field and retry",
            collection
        ))
    } else if lower.contains("text index") {
        McpError::InvalidRequest(format!(
            "collection '{}' has no text index; create one ({{\"<field>\": \"text\"}}) and retry",
            collection
        ))
    } else {
        McpError::ExecutionFailed(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_id_object_id() {
        let coerced = coerce_id(&json!("507f1f77bcf86cd799439011"));
        assert!(matches!(coerced, Bson::ObjectId(_)));
    }

    #[test]
    fn test_coerce_id_passthrough() {
        assert_eq!(coerce_id(&json!("user-42")), Bson::String("user-42".into()));
        assert_eq!(coerce_id(&json!(42)), Bson::Int64(42));
    }

    #[test]
    fn test_parse_center() {
        assert_eq!(parse_center(Some(json!([5.1, 52.0]))).unwrap(), (5.1, 52.0));
        assert!(parse_center(None).is_err());
        assert!(parse_center(Some(json!([5.1]))).is_err());
        assert!(parse_center(Some(json!(["a", "b"]))).is_err());
    }

    #[test]
    fn test_parse_geometry() {
        let geometry = json!({"type": "Polygon", "coordinates": [[[0.0, 0.0]]]});
        assert!(parse_geometry(Some(geometry)).is_ok());
        assert!(parse_geometry(Some(json!({"coordinates": []}))).is_err());
        assert!(parse_geometry(None).is_err());
    }

    #[test]
    fn test_classify_index_errors() {
        let geo = classify_store_error("places", anyhow::anyhow!("unable to find index for $geoNear query"));
        assert!(matches!(geo, McpError::InvalidRequest(_)));
        assert!(geo.to_string().contains("2dsphere"));

        let text = classify_store_error("articles", anyhow::anyhow!("text index required for $text query"));
        assert!(matches!(text, McpError::InvalidRequest(_)));

        let other = classify_store_error("orders", anyhow::anyhow!("connection reset"));
        assert!(matches!(other, McpError::ExecutionFailed(_)));
    }

    #[test]
    fn test_csv_options_validation() {
        assert_eq!(csv_options("query", None, None).unwrap().delimiter, ',');
        assert_eq!(
            csv_options("query", Some(";".into()), Some(false))
                .unwrap()
                .delimiter,
            ';'
        );
        assert!(csv_options("query", Some(";;".into()), None).is_err());
        assert!(csv_options("query", Some("".into()), None).is_err());
    }
}
