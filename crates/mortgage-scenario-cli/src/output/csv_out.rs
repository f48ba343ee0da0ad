use serde_json::Value;
use std::io;

use super::{as_grid, flatten};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some((rows, cols, matrix)) = as_grid(result) {
        // One row per grid cell
        let _ = wtr.write_record(["var1_value", "var2_value", "output_value"]);
        for (row_value, row) in rows.iter().zip(matrix) {
            let Value::Array(cells) = row else { continue };
            for (col_value, cell) in cols.iter().zip(cells) {
                let _ = wtr.write_record([
                    format_csv_value(row_value),
                    format_csv_value(col_value),
                    format_csv_value(cell),
                ]);
            }
        }
    } else if let Value::Object(map) = result {
        // Two-column CSV: field, value
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in flatten(map) {
            let _ = wtr.write_record([key, format_csv_value(&val)]);
        }
    } else {
        let _ = wtr.write_record([format_csv_value(result)]);
    }

    let _ = wtr.flush();
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr
            .iter()
            .map(format_csv_value)
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
