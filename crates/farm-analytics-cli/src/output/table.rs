use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{display_value, unit_value};

/// Render the envelope as tables: scalar fields as Field/Value, nested
/// objects as their own sections, and each list of records (cost rows,
/// category variances) as its own table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_result(result, map),
            None => print_fields(map),
        },
        Value::Array(arr) => print_records(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => print_section(None, res_map),
        Value::Array(items) => print_records(items),
        other => println!("{}", display_value(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// One Field/Value table for the scalars of `map`, then a titled section
/// per nested object (recursively) and a records table per list of objects.
fn print_section(title: Option<&str>, map: &Map<String, Value>) {
    let mut scalars = Vec::new();
    let mut nested = Vec::new();
    let mut lists = Vec::new();
    for (key, val) in map {
        match val {
            Value::Object(inner) if unit_value(inner).is_none() => nested.push((key, inner)),
            Value::Array(items) if items.iter().any(Value::is_object) => lists.push((key, items)),
            _ => scalars.push((key, val)),
        }
    }

    let path = |key: &str| match title {
        Some(t) => format!("{}.{}", t, key),
        None => key.to_string(),
    };

    if !scalars.is_empty() {
        if let Some(t) = title {
            println!("\n{}:", t);
        }
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in scalars {
            builder.push_record([key.as_str(), &display_value(val)]);
        }
        println!("{}", Table::from(builder));
    }

    for (key, inner) in nested {
        print_section(Some(path(key.as_str()).as_str()), inner);
    }

    for (key, items) in lists {
        println!("\n{}:", path(key.as_str()));
        print_records(items);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &display_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_records(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", display_value(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(display_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}
