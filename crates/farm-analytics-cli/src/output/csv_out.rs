use serde_json::Value;
use std::io;

use super::unit_value;

/// Write the result as CSV. A result that is a list of records, or that
/// carries a `rows` list, is written one record per line; anything else
/// becomes field,value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = match value {
        Value::Object(map) => map.get("result").unwrap_or(value),
        _ => value,
    };

    match result {
        Value::Array(records) => write_records(&mut wtr, records),
        Value::Object(map) => match map.get("rows") {
            Some(Value::Array(rows)) => write_records(&mut wtr, rows),
            _ => {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &csv_value(val)]);
                }
            }
        },
        other => {
            let _ = wtr.write_record([&csv_value(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_records(wtr: &mut csv::Writer<io::StdoutLock<'_>>, records: &[Value]) {
    let Some(Value::Object(first)) = records.first() else {
        for item in records {
            let _ = wtr.write_record([&csv_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for item in records {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

/// Undefined figures are written as empty cells.
fn csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Object(map) => match unit_value(map) {
            Some((v, _)) => csv_value(v),
            None => serde_json::to_string(value).unwrap_or_default(),
        },
        Value::Array(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
