//! Visualization hints for result sets.
//!
//! Classifies the fields of a result set and emits short advisory text an
//! agent can use when deciding how to present the data. Classification is
//! best-effort, not a contract: the first document drives type detection,
//! with one full-set pass confirming categorical fields. Date sniffing on
//! strings covers a handful of common formats only.

use bson::{Bson, Document};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Result sets larger than this get the large-dataset advisory.
const LARGE_RESULT_THRESHOLD: usize = 1000;

/// Produce advisory text for a result set. Empty input yields an empty
/// string; blocks are separated by blank lines.
pub fn visualization_hints(documents: &[Document]) -> String {
    let Some(first) = documents.first() else {
        return String::new();
    };

    let mut temporal: Vec<&str> = Vec::new();
    let mut numeric: Vec<&str> = Vec::new();
    let mut string_fields: Vec<&str> = Vec::new();
    let mut geospatial: Vec<&str> = Vec::new();

    for (name, value) in first {
        if is_temporal(value) {
            temporal.push(name);
        }
        if is_numeric(value) {
            numeric.push(name);
        }
        if matches!(value, Bson::String(_)) {
            string_fields.push(name);
        }
        if is_geo_value(value) {
            geospatial.push(name);
        }
    }

    // Categorical confirmation scans the whole set: a field only counts if
    // it is a string in every document.
    let categorical: Vec<&str> = string_fields
        .into_iter()
        .filter(|field| {
            documents
                .iter()
                .all(|doc| matches!(doc.get(field), Some(Bson::String(_))))
        })
        .collect();

    let mut blocks: Vec<String> = Vec::new();

    if !temporal.is_empty() && !numeric.is_empty() {
        let date_field = temporal[0];
        blocks.push(format!(
            "Time series data detected: '{}' is temporal and {} numeric. \
             A line or area chart of {} over '{}' suits this result set.",
            date_field,
            field_list(&numeric),
            field_list(&numeric),
            date_field,
        ));
    }

    if !categorical.is_empty() && !numeric.is_empty() {
        blocks.push(format!(
            "Categorical data detected: {} against {} numeric. \
             A bar chart or grouped summary by category would work well.",
            field_list(&categorical),
            field_list(&numeric),
        ));
    }

    if numeric.len() >= 2 {
        blocks.push(format!(
            "Multiple numeric fields detected ({}). \
             A scatter plot can reveal correlations between pairs of them.",
            field_list(&numeric),
        ));
    }

    if let Some(geo_field) = geospatial.first() {
        blocks.push(format!(
            "Geospatial data detected in '{}'. \
             A map visualization (points or heatmap) fits this result set.",
            geo_field,
        ));
    }

    if documents.len() > LARGE_RESULT_THRESHOLD {
        blocks.push(format!(
            "Large result set ({} documents). \
             Consider aggregating, sampling, or paginating before charting.",
            documents.len(),
        ));
    }

    blocks.join("\n\n")
}

fn field_list(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| format!("'{}'", f))
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_numeric(value: &Bson) -> bool {
    matches!(
        value,
        Bson::Double(_) | Bson::Int32(_) | Bson::Int64(_) | Bson::Decimal128(_)
    )
}

fn is_temporal(value: &Bson) -> bool {
    match value {
        Bson::DateTime(_) | Bson::Timestamp(_) => true,
        Bson::String(s) => looks_like_date(s),
        _ => false,
    }
}

/// Best-effort date sniffing over a few common formats.
fn looks_like_date(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || NaiveDate::parse_from_str(s, "%Y/%m/%d").is_ok()
        || NaiveDate::parse_from_str(s, "%m/%d/%Y").is_ok()
}

/// GeoJSON Point document, or a bare [longitude, latitude] pair.
fn is_geo_value(value: &Bson) -> bool {
    match value {
        Bson::Document(doc) => {
            doc.get_str("type") == Ok("Point") && doc.contains_key("coordinates")
        }
        Bson::Array(pair) => pair.len() == 2 && pair.iter().all(is_numeric),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert_eq!(visualization_hints(&[]), "");
    }

    #[test]
    fn test_time_series_from_date_string() {
        let documents = vec![
            doc! {"day": "2024-01-01", "total": 5},
            doc! {"day": "2024-01-02", "total": 7},
        ];
        let hints = visualization_hints(&documents);
        assert!(hints.contains("Time series"), "{}", hints);
    }

    #[test]
    fn test_time_series_from_bson_datetime() {
        let documents = vec![doc! {
            "at": bson::DateTime::from_millis(1_700_000_000_000i64),
            "value": 1.5
        }];
        assert!(visualization_hints(&documents).contains("Time series"));
    }

    #[test]
    fn test_no_time_series_without_numeric() {
        let documents = vec![doc! {"day": "2024-01-01", "label": "a"}];
        assert!(!visualization_hints(&documents).contains("Time series"));
    }

    #[test]
    fn test_categorical_requires_strings_in_every_document() {
        let consistent = vec![
            doc! {"status": "open", "n": 1},
            doc! {"status": "closed", "n": 2},
        ];
        assert!(visualization_hints(&consistent).contains("Categorical"));

        let mixed = vec![doc! {"status": "open", "n": 1}, doc! {"status": 3, "n": 2}];
        assert!(!visualization_hints(&mixed).contains("Categorical"));

        let missing = vec![doc! {"status": "open", "n": 1}, doc! {"n": 2}];
        assert!(!visualization_hints(&missing).contains("Categorical"));
    }

    #[test]
    fn test_scatter_for_two_numeric_fields() {
        let documents = vec![doc! {"width": 3, "height": 4.5}];
        assert!(visualization_hints(&documents).contains("scatter plot"));
    }

    #[test]
    fn test_geospatial_point_and_pair() {
        let point = vec![doc! {"loc": {"type": "Point", "coordinates": [5.1, 52.0]}}];
        assert!(visualization_hints(&point).contains("Geospatial"));

        let pair = vec![doc! {"loc": [5.1, 52.0]}];
        assert!(visualization_hints(&pair).contains("Geospatial"));

        let not_geo = vec![doc! {"loc": [5.1, 52.0, 9.9]}];
        assert!(!visualization_hints(&not_geo).contains("Geospatial"));
    }

    #[test]
    fn test_large_dataset_threshold() {
        let small: Vec<Document> = (0..LARGE_RESULT_THRESHOLD).map(|i| doc! {"i": i as i32}).collect();
        assert!(!visualization_hints(&small).contains("Large result set"));

        let large: Vec<Document> = (0..=LARGE_RESULT_THRESHOLD).map(|i| doc! {"i": i as i32}).collect();
        assert!(visualization_hints(&large).contains("Large result set"));
    }

    #[test]
    fn test_block_separator() {
        let documents = vec![doc! {"day": "2024-01-01", "a": 1, "b": 2}];
        let hints = visualization_hints(&documents);
        assert!(hints.contains("\n\n"));
    }
}
