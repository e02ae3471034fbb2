pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Decimals travel as strings in the JSON envelope. Human-facing formats
/// show them to the cent; anything that is not a number passes through.
pub(crate) fn display_string(s: &str) -> String {
    match Decimal::from_str(s) {
        Ok(d) => d
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .to_string(),
        Err(_) => s.to_string(),
    }
}

/// Flatten nested objects into dotted keys (`operating_expenses.total`) so
/// two-column formats stay two columns. Arrays are left as leaves.
pub(crate) fn flatten_fields<'a>(
    map: &'a serde_json::Map<String, Value>,
) -> Vec<(String, &'a Value)> {
    let mut fields = Vec::with_capacity(map.len());
    for (key, val) in map {
        match val {
            Value::Object(inner) => {
                for (inner_key, inner_val) in flatten_fields(inner) {
                    fields.push((format!("{key}.{inner_key}"), inner_val));
                }
            }
            _ => fields.push((key.clone(), val)),
        }
    }
    fields
}
