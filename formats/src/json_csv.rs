//! JSON ↔ CSV structural conversion
//!
//! Nested documents flatten into dotted path keys (`a.b`, `a.0.c`); the
//! column set is the union of all leaf paths in first-seen order. The
//! reverse direction reads the first record as the header and produces
//! header-keyed string objects with no type inference.

use crate::{Error, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;

fn csv_err(e: impl std::fmt::Display) -> Error {
    Error::Csv(e.to_string())
}

/// Flatten a JSON document into comma-separated text with a header row.
pub fn json_to_csv(data: &[u8]) -> Result<Vec<u8>> {
    let value: Value = serde_json::from_slice(data)?;

    // A top-level array is a table; anything else is a single record.
    let records: Vec<&Value> = match &value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut columns: Vec<String> = Vec::new();
    let mut rows: Vec<HashMap<String, String>> = Vec::new();
    for record in records {
        let mut row = HashMap::new();
        flatten(record, String::new(), &mut columns, &mut row);
        rows.push(row);
    }

    // No leaf paths at all (e.g. `{}`) flattens to nothing.
    if columns.is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns).map_err(csv_err)?;
    for row in &rows {
        let record: Vec<&str> = columns
            .iter()
            .map(|col| row.get(col).map(String::as_str).unwrap_or(""))
            .collect();
        writer.write_record(&record).map_err(csv_err)?;
    }

    writer.into_inner().map_err(csv_err)
}

fn flatten(
    value: &Value,
    path: String,
    columns: &mut Vec<String>,
    row: &mut HashMap<String, String>,
) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten(child, join_path(&path, key), columns, row);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(item, join_path(&path, &index.to_string()), columns, row);
            }
        }
        scalar => {
            if !columns.iter().any(|c| c == &path) {
                columns.push(path.clone());
            }
            row.insert(path, scalar_string(scalar));
        }
    }
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

/// Parse comma-separated text into a JSON array of header-keyed objects.
pub fn csv_to_json(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(csv_err)?,
        // Zero records: an empty table, not an error
        None => return Ok(b"[]".to_vec()),
    };

    let mut result: Vec<Value> = Vec::new();
    for record in records {
        let record = record.map_err(csv_err)?;
        let mut row = Map::new();
        for (index, column) in header.iter().enumerate() {
            // Missing trailing fields default to empty
            let field = record.get(index).unwrap_or("");
            row.insert(column.to_string(), Value::String(field.to_string()));
        }
        result.push(Value::Object(row));
    }

    Ok(serde_json::to_vec(&Value::Array(result))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn csv_text(value: Value) -> String {
        let bytes = json_to_csv(&serde_json::to_vec(&value).unwrap()).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_flat_object_single_row() {
        let out = csv_text(json!({"a": 1, "b": "x"}));
        assert_eq!(out, "a,b\n1,x\n");
    }

    #[test]
    fn test_nested_paths_are_dotted() {
        let out = csv_text(json!({"a": {"b": 1}, "c": [5, 6]}));
        assert_eq!(out, "a.b,c.0,c.1\n1,5,6\n");
    }

    #[test]
    fn test_array_of_objects_one_row_each() {
        let out = csv_text(json!([{"a": 1}, {"a": 2, "b": 3}]));
        // Column set is the union in first-seen order; short rows pad
        assert_eq!(out, "a,b\n1,\n2,3\n");
    }

    #[test]
    fn test_top_level_scalar_one_cell() {
        let out = csv_text(json!(42));
        assert_eq!(out, "\"\"\n42\n");
    }

    #[test]
    fn test_empty_object_flattens_to_nothing() {
        let out = json_to_csv(b"{}").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_csv_to_json_header_keyed_strings() {
        let out = csv_to_json(b"a,b\n1,x\n2,y\n").unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value, json!([{"a": "1", "b": "x"}, {"a": "2", "b": "y"}]));
    }

    #[test]
    fn test_csv_to_json_empty_input() {
        assert_eq!(csv_to_json(b"").unwrap(), b"[]".to_vec());
    }

    #[test]
    fn test_csv_to_json_missing_trailing_fields() {
        let out = csv_to_json(b"a,b,c\n1,2\n").unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value, json!([{"a": "1", "b": "2", "c": ""}]));
    }

    #[test]
    fn test_flatten_round_trip_preserves_leaf_pairs() {
        let input = json!({"order": {"id": "O1", "lines": [{"sku": "A"}, {"sku": "B"}]}, "total": 19.99});
        let csv = json_to_csv(&serde_json::to_vec(&input).unwrap()).unwrap();
        let back: Value = serde_json::from_slice(&csv_to_json(&csv).unwrap()).unwrap();
        assert_eq!(
            back,
            json!([{
                "order.id": "O1",
                "order.lines.0.sku": "A",
                "order.lines.1.sku": "B",
                "total": "19.99"
            }])
        );
    }
}
