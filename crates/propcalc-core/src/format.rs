use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{Money, Percent};

/// Shown in place of a figure that cannot be displayed.
pub const NOT_AVAILABLE: &str = "N/A";

/// US-dollar amount with thousands separators and no cents: `$1,216`, `-$500`.
pub fn format_currency(amount: Money) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        return "$0".to_string();
    }
    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    format!("{sign}${}", group_thousands(&rounded.abs().trunc().to_string()))
}

/// Percentage to two decimal places: `17.83%`.
pub fn format_percentage(value: Percent) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    format!("{rounded:.2}%")
}

/// `format_currency` for raw floats; non-finite input renders as `N/A`.
pub fn format_currency_f64(amount: f64) -> String {
    match Decimal::from_f64(amount) {
        Some(d) if amount.is_finite() => format_currency(d),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// `format_percentage` for raw floats; non-finite input renders as `N/A`.
pub fn format_percentage_f64(value: f64) -> String {
    match Decimal::from_f64(value) {
        Some(d) if value.is_finite() => format_percentage(d),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
