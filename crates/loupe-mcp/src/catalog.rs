//! The fixed catalog of read-only tools.
//!
//! Unlike a role-driven system, Loupe's catalog never changes shape: every
//! deployment exposes the same fourteen operations, all annotated read-only.
//! Tool descriptions are written for the consuming agent, not for humans.

use crate::protocol::{ToolAnnotations, ToolDefinition};
use serde_json::{json, Value};

fn read_only() -> Option<ToolAnnotations> {
    Some(ToolAnnotations {
        read_only: Some(true),
    })
}

fn tool(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
        annotations: read_only(),
    }
}

/// JSON schema fragment for the shared database/collection pair.
fn database_property() -> Value {
    json!({
        "type": "string",
        "description": "Database name. Falls back to the configured default database."
    })
}

fn collection_property() -> Value {
    json!({
        "type": "string",
        "description": "Collection name, exactly as returned by list_collections."
    })
}

fn filter_property() -> Value {
    json!({
        "type": "object",
        "description": "MongoDB query filter document, e.g. {\"status\": \"active\"}."
    })
}

fn format_property() -> Value {
    json!({
        "type": "string",
        "enum": ["json", "csv"],
        "default": "json",
        "description": "Output format. CSV flattens documents into a delimited grid."
    })
}

/// Build the full tool catalog.
pub fn builtin_tools() -> Vec<ToolDefinition> {
    vec![
        tool(
            "list_databases",
            "List all databases visible on the connected deployment.",
            json!({"type": "object", "properties": {}}),
        ),
        tool(
            "list_collections",
            "List collections in a database.",
            json!({
                "type": "object",
                "properties": {"database": database_property()}
            }),
        ),
        tool(
            "collection_schema",
            "Infer the structural schema of a collection from a random sample of its documents. \
             Field types, nested shapes, and example values are reported; conflicting shapes keep \
             the first observed type.",
            json!({
                "type": "object",
                "properties": {
                    "database": database_property(),
                    "collection": collection_property(),
                    "sample_size": {
                        "type": "integer",
                        "default": 100,
                        "description": "Number of documents to sample."
                    }
                },
                "required": ["collection"]
            }),
        ),
        tool(
            "query",
            "Run a filtered find against a collection.",
            json!({
                "type": "object",
                "properties": {
                    "database": database_property(),
                    "collection": collection_property(),
                    "filter": filter_property(),
                    "projection": {
                        "type": "object",
                        "description": "Fields to include/exclude, e.g. {\"name\": 1, \"_id\": 0}."
                    },
                    "sort": {
                        "type": "object",
                        "description": "Sort specification, e.g. {\"createdAt\": -1}."
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of documents to return."
                    },
                    "format": format_property(),
                    "delimiter": {
                        "type": "string",
                        "description": "CSV delimiter, a single character. Defaults to a comma."
                    },
                    "include_headers": {
                        "type": "boolean",
                        "default": true,
                        "description": "Whether CSV output starts with a header row."
                    }
                },
                "required": ["collection"]
            }),
        ),
        tool(
            "aggregate",
            "Run a read-only aggregation pipeline. Stages that can write or reshape stored data \
             ($out, $merge, $addFields, $set, $unset, $replaceRoot, $replaceWith) are rejected \
             before execution.",
            json!({
                "type": "object",
                "properties": {
                    "database": database_property(),
                    "collection": collection_property(),
                    "pipeline": {
                        "type": "array",
                        "items": {"type": "object"},
                        "description": "Aggregation pipeline stages, in order."
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Cap on the number of result documents."
                    }
                },
                "required": ["collection", "pipeline"]
            }),
        ),
        tool(
            "count_documents",
            "Count documents matching a filter.",
            json!({
                "type": "object",
                "properties": {
                    "database": database_property(),
                    "collection": collection_property(),
                    "filter": filter_property()
                },
                "required": ["collection"]
            }),
        ),
        tool(
            "distinct_values",
            "List the distinct values of a field across matching documents.",
            json!({
                "type": "object",
                "properties": {
                    "database": database_property(),
                    "collection": collection_property(),
                    "field": {
                        "type": "string",
                        "description": "Field to collect distinct values for (dot paths allowed)."
                    },
                    "filter": filter_property()
                },
                "required": ["collection", "field"]
            }),
        ),
        tool(
            "sample_data",
            "Return a random sample of documents from a collection.",
            json!({
                "type": "object",
                "properties": {
                    "database": database_property(),
                    "collection": collection_property(),
                    "size": {
                        "type": "integer",
                        "default": 10,
                        "description": "Number of documents to sample."
                    },
                    "format": format_property(),
                    "delimiter": {
                        "type": "string",
                        "description": "CSV delimiter, a single character. Defaults to a comma."
                    },
                    "include_headers": {
                        "type": "boolean",
                        "default": true,
                        "description": "Whether CSV output starts with a header row."
                    }
                },
                "required": ["collection"]
            }),
        ),
        tool(
            "collection_stats",
            "Storage and document statistics for a collection.",
            json!({
                "type": "object",
                "properties": {
                    "database": database_property(),
                    "collection": collection_property()
                },
                "required": ["collection"]
            }),
        ),
        tool(
            "list_indexes",
            "List the indexes defined on a collection.",
            json!({
                "type": "object",
                "properties": {
                    "database": database_property(),
                    "collection": collection_property()
                },
                "required": ["collection"]
            }),
        ),
        tool(
            "explain_query",
            "Show the execution plan the store would use for a find, without running it to \
             completion. The plan is returned as-is.",
            json!({
                "type": "object",
                "properties": {
                    "database": database_property(),
                    "collection": collection_property(),
                    "filter": filter_property(),
                    "projection": {"type": "object"},
                    "sort": {"type": "object"}
                },
                "required": ["collection"]
            }),
        ),
        tool(
            "find_by_ids",
            "Fetch documents whose id is in a batch of values. 24-character hex strings are \
             treated as ObjectIds; other values match as-is.",
            json!({
                "type": "object",
                "properties": {
                    "database": database_property(),
                    "collection": collection_property(),
                    "ids": {
                        "type": "array",
                        "description": "Non-empty batch of id values to look up."
                    },
                    "field": {
                        "type": "string",
                        "default": "_id",
                        "description": "Field to match ids against."
                    }
                },
                "required": ["collection", "ids"]
            }),
        ),
        tool(
            "geo_query",
            "Geospatial query: documents near a point, or within/intersecting a GeoJSON \
             geometry. Requires a geospatial index on the location field.",
            json!({
                "type": "object",
                "properties": {
                    "database": database_property(),
                    "collection": collection_property(),
                    "location_field": {
                        "type": "string",
                        "description": "Field holding the GeoJSON location."
                    },
                    "mode": {
                        "type": "string",
                        "enum": ["near", "within", "intersects"],
                        "description": "Proximity search, containment, or intersection."
                    },
                    "center": {
                        "type": "array",
                        "items": {"type": "number"},
                        "description": "[longitude, latitude] pair. Required for mode \"near\"."
                    },
                    "geometry": {
                        "type": "object",
                        "description": "GeoJSON geometry. Required for \"within\"/\"intersects\"."
                    },
                    "max_distance": {
                        "type": "number",
                        "description": "Maximum distance in meters (mode \"near\")."
                    },
                    "min_distance": {
                        "type": "number",
                        "description": "Minimum distance in meters (mode \"near\")."
                    },
                    "distance_field": {
                        "type": "string",
                        "default": "distance",
                        "description": "Output field holding the computed distance (mode \"near\")."
                    },
                    "spherical": {
                        "type": "boolean",
                        "default": true,
                        "description": "Use spherical geometry for distance calculation."
                    },
                    "filter": filter_property(),
                    "limit": {"type": "integer"}
                },
                "required": ["collection", "location_field", "mode"]
            }),
        ),
        tool(
            "text_search",
            "Keyword search over a collection's text index, optionally ranked by relevance \
             score. Requires a text index.",
            json!({
                "type": "object",
                "properties": {
                    "database": database_property(),
                    "collection": collection_property(),
                    "search": {
                        "type": "string",
                        "description": "Search text. Quote phrases for exact matching."
                    },
                    "filter": filter_property(),
                    "include_score": {
                        "type": "boolean",
                        "default": false,
                        "description": "Attach the relevance score and sort by it."
                    },
                    "limit": {"type": "integer"}
                },
                "required": ["collection", "search"]
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_size_and_uniqueness() {
        let tools = builtin_tools();
        assert_eq!(tools.len(), 14);

        let mut names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 14);
    }

    #[test]
    fn test_every_tool_is_read_only() {
        for tool in builtin_tools() {
            let annotations = tool.annotations.expect("annotations present");
            assert_eq!(annotations.read_only, Some(true), "{}", tool.name);
        }
    }

    #[test]
    fn test_collection_tools_require_collection() {
        for tool in builtin_tools() {
            if tool.name == "list_databases" || tool.name == "list_collections" {
                continue;
            }
            let required = tool.input_schema["required"]
                .as_array()
                .unwrap_or_else(|| panic!("{} has required fields", tool.name));
            assert!(
                required.iter().any(|v| v == "collection"),
                "{} requires collection",
                tool.name
            );
        }
    }
}
