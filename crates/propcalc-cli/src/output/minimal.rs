use serde_json::Value;

use super::display_string;

/// Headline figure per command, first match wins.
const HEADLINE_KEYS: [&str; 5] = [
    "total_roi",
    "total_monthly_payment",
    "monthly_cash_flow",
    "monthly_payment",
    "is_valid",
];

/// Print only the headline answer: ROI for a projection, the monthly payment
/// for a mortgage or schedule, cash flow for a rental, validity for a form.
/// A list (timeline or schedule rows) reports its last entry.
pub fn print_minimal(value: &Value) {
    let body = match value {
        Value::Object(map) => map.get("result").unwrap_or(value),
        Value::Array(items) => items.last().unwrap_or(value),
        _ => value,
    };

    if let Value::Object(map) = body {
        let headline = HEADLINE_KEYS
            .iter()
            .find_map(|key| map.get(*key).filter(|v| !v.is_null()));
        if let Some(val) = headline {
            println!("{}", format_minimal(val));
            return;
        }
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(body));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => display_string(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
