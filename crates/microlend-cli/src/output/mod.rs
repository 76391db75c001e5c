pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// A result object split for tabular rendering.
pub(crate) struct SplitResult {
    /// Scalar fields; nested objects flattened to `parent.child` keys
    pub fields: Vec<(String, Value)>,
    /// Arrays of objects such as schedules, rendered as their own tables
    pub rows: Vec<(String, Vec<Value>)>,
}

fn is_row_array(value: &Value) -> bool {
    matches!(value, Value::Array(items) if items.first().is_some_and(Value::is_object))
}

pub(crate) fn split_result(map: &Map<String, Value>) -> SplitResult {
    let mut split = SplitResult {
        fields: Vec::new(),
        rows: Vec::new(),
    };
    flatten_into(&mut split, "", map);
    split
}

fn flatten_into(split: &mut SplitResult, prefix: &str, map: &Map<String, Value>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(split, &name, inner),
            Value::Array(items) if is_row_array(val) => split.rows.push((name, items.clone())),
            _ => split.fields.push((name, val.clone())),
        }
    }
}

/// Column headers taken from the first row.
pub(crate) fn row_headers(rows: &[Value]) -> Vec<String> {
    match rows.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_result_flattens_and_extracts_schedule() {
        let result = json!({
            "installment": "8885",
            "summary": { "total_payable": "106620", "total_interest": "6620" },
            "schedule": [
                { "period": 1, "closing_balance": "92115" },
                { "period": 2, "closing_balance": "84151" }
            ],
            "rate_values": ["12", "14"]
        });
        let split = split_result(result.as_object().unwrap());

        let keys: Vec<&str> = split.fields.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"summary.total_interest"));
        assert!(keys.contains(&"rate_values"));
        assert_eq!(split.rows.len(), 1);
        assert_eq!(split.rows[0].0, "schedule");
        let mut headers = row_headers(&split.rows[0].1);
        headers.sort();
        assert_eq!(headers, vec!["closing_balance", "period"]);
    }
}
