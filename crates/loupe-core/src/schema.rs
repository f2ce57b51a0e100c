//! Structural schema inference over document samples.
//!
//! Collections are schema-less, so Loupe infers a merged structural schema by
//! folding over a finite sample of documents. The fold is first-seen-wins:
//! once a field path has an entry it is never downgraded or merged with a
//! conflicting type from a later document. The one refinement is that a path
//! first observed as null keeps `nullable: true` but takes its type and
//! example from the first non-null observation.

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A merged schema: field name to inferred entry.
pub type SchemaMap = BTreeMap<String, FieldSchema>;

/// Inferred schema entry for a single field path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSchema {
    /// Type tag: null, boolean, number, string, date, timestamp, objectId,
    /// binary, regex, array, object, or unknown.
    #[serde(rename = "type")]
    pub type_tag: String,

    /// Nested schema for object-valued fields and array-of-object elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<SchemaMap>,

    /// Element descriptor for array-valued fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<FieldSchema>>,

    /// Literal example value for scalar fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    /// Whether the field was observed as null.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
}

impl FieldSchema {
    fn tagged(type_tag: &str) -> Self {
        Self {
            type_tag: type_tag.to_string(),
            properties: None,
            items: None,
            example: None,
            nullable: false,
        }
    }
}

/// Type tag for a single value.
pub fn type_tag(value: &Bson) -> &'static str {
    match value {
        Bson::Double(_) | Bson::Int32(_) | Bson::Int64(_) | Bson::Decimal128(_) => "number",
        Bson::String(_) | Bson::Symbol(_) => "string",
        Bson::Boolean(_) => "boolean",
        Bson::Null | Bson::Undefined => "null",
        Bson::Array(_) => "array",
        Bson::Document(_) => "object",
        Bson::ObjectId(_) => "objectId",
        Bson::DateTime(_) => "date",
        Bson::Timestamp(_) => "timestamp",
        Bson::Binary(_) => "binary",
        Bson::RegularExpression(_) => "regex",
        _ => "unknown",
    }
}

/// Infer a merged schema from a sample of documents.
///
/// Callers are responsible for the empty-sample case; an empty slice yields
/// an empty map, which is not a meaningful schema.
pub fn infer_schema(sample: &[Document]) -> SchemaMap {
    let mut schema = SchemaMap::new();
    for document in sample {
        merge_document(&mut schema, document);
    }
    schema
}

/// Fold one document into the accumulator.
fn merge_document(schema: &mut SchemaMap, document: &Document) {
    for (name, value) in document {
        match schema.get(name) {
            None => {
                schema.insert(name.clone(), field_schema(value));
            }
            // A null-typed entry is filled in by the first non-null
            // observation; the nullable flag survives.
            Some(existing) if existing.type_tag == "null" && !is_null(value) => {
                let mut refined = field_schema(value);
                refined.nullable = true;
                schema.insert(name.clone(), refined);
            }
            Some(_) => {}
        }
    }
}

fn is_null(value: &Bson) -> bool {
    matches!(value, Bson::Null | Bson::Undefined)
}

/// Build the schema entry for a single observed value.
fn field_schema(value: &Bson) -> FieldSchema {
    match value {
        Bson::Array(elements) => {
            let items = match elements.first() {
                None => FieldSchema::tagged("unknown"),
                Some(Bson::Document(_)) => {
                    let mut properties = SchemaMap::new();
                    for element in elements {
                        if let Bson::Document(doc) = element {
                            merge_document(&mut properties, doc);
                        }
                    }
                    FieldSchema {
                        properties: Some(properties),
                        ..FieldSchema::tagged("object")
                    }
                }
                Some(first) => FieldSchema::tagged(type_tag(first)),
            };
            FieldSchema {
                items: Some(Box::new(items)),
                ..FieldSchema::tagged("array")
            }
        }
        Bson::Document(doc) => {
            let mut properties = SchemaMap::new();
            merge_document(&mut properties, doc);
            FieldSchema {
                properties: Some(properties),
                ..FieldSchema::tagged("object")
            }
        }
        scalar => FieldSchema {
            example: Some(scalar.clone().into_relaxed_extjson()),
            nullable: is_null(scalar),
            ..FieldSchema::tagged(type_tag(scalar))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde_json::json;

    #[test]
    fn test_first_seen_wins() {
        let sample = vec![doc! {"a": 1}, doc! {"a": 2, "b": "x"}];
        let schema = infer_schema(&sample);

        let a = &schema["a"];
        assert_eq!(a.type_tag, "number");
        assert_eq!(a.example, Some(json!(1)));

        let b = &schema["b"];
        assert_eq!(b.type_tag, "string");
        assert_eq!(b.example, Some(json!("x")));
    }

    #[test]
    fn test_conflicting_types_do_not_downgrade() {
        let sample = vec![doc! {"a": "text"}, doc! {"a": 7}];
        let schema = infer_schema(&sample);
        assert_eq!(schema["a"].type_tag, "string");
        assert_eq!(schema["a"].example, Some(json!("text")));
    }

    #[test]
    fn test_null_refined_by_first_non_null() {
        let sample = vec![doc! {"a": Bson::Null}, doc! {"a": 3}, doc! {"a": "late"}];
        let schema = infer_schema(&sample);
        let a = &schema["a"];
        assert_eq!(a.type_tag, "number");
        assert_eq!(a.example, Some(json!(3)));
        assert!(a.nullable);
    }

    #[test]
    fn test_empty_array_yields_unknown_items() {
        let sample = vec![doc! {"tags": Bson::Array(vec![])}];
        let schema = infer_schema(&sample);
        let tags = &schema["tags"];
        assert_eq!(tags.type_tag, "array");
        assert_eq!(tags.items.as_ref().unwrap().type_tag, "unknown");
    }

    #[test]
    fn test_scalar_array_items() {
        let sample = vec![doc! {"scores": [1, 2, 3]}];
        let schema = infer_schema(&sample);
        assert_eq!(schema["scores"].items.as_ref().unwrap().type_tag, "number");
    }

    #[test]
    fn test_array_of_objects_merges_element_shapes() {
        let sample = vec![doc! {"events": [
            {"kind": "open"},
            {"kind": "close", "at": bson::DateTime::from_millis(0)}
        ]}];
        let schema = infer_schema(&sample);

        let items = schema["events"].items.as_ref().unwrap();
        assert_eq!(items.type_tag, "object");
        let properties = items.properties.as_ref().unwrap();
        assert_eq!(properties["kind"].type_tag, "string");
        assert_eq!(properties["at"].type_tag, "date");
    }

    #[test]
    fn test_nested_object_recursion() {
        let sample = vec![doc! {"address": {"city": "Utrecht", "geo": {"lat": 52.09}}}];
        let schema = infer_schema(&sample);

        let address = schema["address"].properties.as_ref().unwrap();
        assert_eq!(address["city"].type_tag, "string");
        let geo = address["geo"].properties.as_ref().unwrap();
        assert_eq!(geo["lat"].type_tag, "number");
    }

    #[test]
    fn test_opaque_reference_and_date_tags() {
        let sample = vec![doc! {
            "_id": bson::oid::ObjectId::new(),
            "created_at": bson::DateTime::from_millis(1_700_000_000_000i64)
        }];
        let schema = infer_schema(&sample);
        assert_eq!(schema["_id"].type_tag, "objectId");
        assert_eq!(schema["created_at"].type_tag, "date");
    }

    #[test]
    fn test_empty_sample_yields_empty_map() {
        assert!(infer_schema(&[]).is_empty());
    }
}
