pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar for human-facing formats. Undefined figures (null)
/// print as "N/A"; a `{value, unit}` pair prints as "value unit".
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "N/A".to_string(),
        Value::Array(arr) => arr.iter().map(display_value).collect::<Vec<_>>().join(", "),
        Value::Object(map) => match unit_value(map) {
            Some((v, unit)) => format!("{} {}", display_value(v), unit),
            None => serde_json::to_string(value).unwrap_or_default(),
        },
    }
}

/// Recognise a serialized `UnitValue`.
pub fn unit_value(map: &serde_json::Map<String, Value>) -> Option<(&Value, &str)> {
    if map.len() != 2 {
        return None;
    }
    match (map.get("value"), map.get("unit")) {
        (Some(v), Some(Value::String(unit))) => Some((v, unit.as_str())),
        _ => None,
    }
}
