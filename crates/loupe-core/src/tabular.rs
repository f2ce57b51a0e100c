//! CSV serialization for heterogeneous result sets.
//!
//! Documents in one result set rarely share a shape, so the column set is
//! the union of all field names across the set in first-encounter order.
//! Nested documents and arrays are stringified as relaxed Extended JSON,
//! which is lossy on purpose: CSV consumers get a flat grid.

use bson::{Bson, Document};
use std::collections::HashSet;

/// Formatting options for CSV output.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Cell delimiter.
    pub delimiter: char,
    /// Whether to emit a header row.
    pub include_headers: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            include_headers: true,
        }
    }
}

/// Serialize a result set to CSV text.
///
/// Rows are `\n`-terminated with no CRLF. An empty result set yields an
/// empty string with no header row, even when headers are requested.
pub fn to_csv(documents: &[Document], options: &CsvOptions) -> String {
    if documents.is_empty() {
        return String::new();
    }

    let mut columns: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for document in documents {
        for name in document.keys() {
            if seen.insert(name.as_str()) {
                columns.push(name.as_str());
            }
        }
    }

    let delimiter = options.delimiter;
    let mut out = String::new();

    if options.include_headers {
        push_row(
            &mut out,
            columns.iter().map(|c| escape_cell(c, delimiter)),
            delimiter,
        );
    }

    for document in documents {
        push_row(
            &mut out,
            columns
                .iter()
                .map(|c| escape_cell(&render_cell(document.get(c)), delimiter)),
            delimiter,
        );
    }

    out
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>, delimiter: char) {
    let mut first = true;
    for cell in cells {
        if !first {
            out.push(delimiter);
        }
        out.push_str(&cell);
        first = false;
    }
    out.push('\n');
}

/// Render one cell value as plain text.
fn render_cell(value: Option<&Bson>) -> String {
    match value {
        None | Some(Bson::Null) | Some(Bson::Undefined) => String::new(),
        Some(Bson::String(s)) => s.clone(),
        Some(Bson::Boolean(b)) => b.to_string(),
        Some(Bson::Int32(n)) => n.to_string(),
        Some(Bson::Int64(n)) => n.to_string(),
        Some(Bson::Double(n)) => n.to_string(),
        Some(Bson::Decimal128(n)) => n.to_string(),
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::DateTime(dt)) => dt
            .try_to_rfc3339_string()
            .unwrap_or_else(|_| dt.timestamp_millis().to_string()),
        Some(other) => {
            serde_json::to_string(&other.clone().into_relaxed_extjson()).unwrap_or_default()
        }
    }
}

/// Quote-wrap a cell iff it contains the delimiter, a quote, or a newline;
/// internal quotes are doubled.
fn escape_cell(cell: &str, delimiter: char) -> String {
    if cell.contains(delimiter) || cell.contains('"') || cell.contains('\n') || cell.contains('\r')
    {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_header_union_and_empty_cells() {
        let documents = vec![doc! {"x": 1, "y": 2}, doc! {"x": 3, "z": 4}];
        let csv = to_csv(&documents, &CsvOptions::default());
        assert_eq!(csv, "x,y,z\n1,2,\n3,,4\n");
    }

    #[test]
    fn test_escaping() {
        let documents = vec![doc! {"v": "a,\"b\""}];
        let csv = to_csv(&documents, &CsvOptions::default());
        assert_eq!(csv, "v\n\"a,\"\"b\"\"\"\n");
    }

    #[test]
    fn test_newline_in_cell_is_quoted() {
        let documents = vec![doc! {"v": "line one\nline two"}];
        let csv = to_csv(&documents, &CsvOptions::default());
        assert_eq!(csv, "v\n\"line one\nline two\"\n");
    }

    #[test]
    fn test_nested_values_render_as_json() {
        let documents = vec![doc! {"meta": {"a": 1}, "tags": ["x", "y"]}];
        let csv = to_csv(&documents, &CsvOptions::default());
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("meta,tags"));
        let row = lines.next().unwrap();
        assert!(row.contains("\"\"a\"\""), "json quotes doubled: {}", row);
        assert!(row.contains("x"));
    }

    #[test]
    fn test_null_and_missing_are_empty() {
        let documents = vec![doc! {"a": Bson::Null, "b": 1}, doc! {"b": 2}];
        let csv = to_csv(&documents, &CsvOptions::default());
        assert_eq!(csv, "a,b\n,1\n,2\n");
    }

    #[test]
    fn test_empty_set_has_no_header() {
        assert_eq!(to_csv(&[], &CsvOptions::default()), "");
    }

    #[test]
    fn test_custom_delimiter_and_no_headers() {
        let documents = vec![doc! {"a": "x;y", "b": 1}];
        let options = CsvOptions {
            delimiter: ';',
            include_headers: false,
        };
        assert_eq!(to_csv(&documents, &options), "\"x;y\";1\n");
    }

    #[test]
    fn test_round_trips_through_standard_reader() {
        let documents = vec![
            doc! {"name": "a,\"b\"", "n": 1},
            doc! {"name": "plain", "extra": "multi\nline"},
        ];
        let csv_text = to_csv(&documents, &CsvOptions::default());

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv_text.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["name", "n", "extra"]);

        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        assert_eq!(rows[0], vec!["a,\"b\"", "1", ""]);
        assert_eq!(rows[1], vec!["plain", "", "multi\nline"]);
    }
}
