use serde_json::{Map, Value};

use super::{display_value, unit_value};

/// Headline figure per command, first match wins.
const HEADLINE_KEYS: [&str; 6] = [
    "converted",
    "break_even_price_per_tonne",
    "profit_loss",
    "total_cost",
    "total_variable",
    "percent",
];

/// Print just the headline figure of a result.
pub fn print_minimal(value: &Value) {
    let result = match value {
        Value::Object(map) => map.get("result").unwrap_or(value),
        _ => value,
    };
    println!("{}", headline(result));
}

fn headline(result: &Value) -> String {
    match result {
        Value::Object(map) => headline_of(map),
        Value::Array(items) => items.iter().map(headline).collect::<Vec<_>>().join("\n"),
        other => display_value(other),
    }
}

fn headline_of(map: &Map<String, Value>) -> String {
    // crop analysis nests profitability
    if let Some(Value::Object(inner)) = map.get("profitability") {
        return headline_of(inner);
    }

    // benchmark evaluation
    if let (Some(Value::String(name)), Some(Value::Object(pos))) = (map.get("name"), map.get("position")) {
        let class = pos.get("classification").map(display_value).unwrap_or_default();
        let pct = pos.get("current_pct").map(display_value).unwrap_or_default();
        return format!("{}: {} ({}%)", name, class, pct);
    }

    for key in HEADLINE_KEYS {
        match map.get(key) {
            Some(Value::Object(m)) if unit_value(m).is_none() => continue,
            Some(v) => return display_value(v),
            None => continue,
        }
    }

    match map.iter().next() {
        Some((key, v)) => format!("{}: {}", key, display_value(v)),
        None => String::new(),
    }
}
