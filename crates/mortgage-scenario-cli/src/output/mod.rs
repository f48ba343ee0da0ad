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

/// Flatten nested objects into `group.field` rows, keeping field order.
pub(crate) fn flatten(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut rows = Vec::new();
    flatten_into(None, map, &mut rows);
    rows
}

fn flatten_into(prefix: Option<&str>, map: &Map<String, Value>, rows: &mut Vec<(String, Value)>) {
    for (key, val) in map {
        let name = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        match val {
            Value::Object(inner) => flatten_into(Some(&name), inner, rows),
            _ => rows.push((name, val.clone())),
        }
    }
}

/// Sensitivity results carry a `matrix` with row and column values.
pub(crate) fn as_grid(result: &Value) -> Option<(&[Value], &[Value], &[Value])> {
    let map = result.as_object()?;
    Some((
        map.get("variable_1_values")?.as_array()?.as_slice(),
        map.get("variable_2_values")?.as_array()?.as_slice(),
        map.get("matrix")?.as_array()?.as_slice(),
    ))
}
