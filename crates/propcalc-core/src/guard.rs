use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CalculatorDefaults;
use crate::primitives::monthly_mortgage_payment;
use crate::projection::CalculatorInput;
use crate::types::{Money, Percent};

/// Upper bound for any currency field. Keeps compounding inside Decimal range.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// `MAX_AMOUNT` for inputs that arrive already as decimals.
pub const MAX_MONEY: Decimal = dec!(1000000000000);

/// Upper bound for holding period and loan term (longest mortgage on offer).
pub const MAX_YEARS: u32 = 50;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Calculator form state as received from the UI. Every field is optional so
/// that half-filled forms can be validated as the user types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCalculatorInput {
    pub property_value: Option<f64>,
    pub down_payment_amount: Option<f64>,
    pub down_payment_percent: Option<f64>,
    pub closing_costs: Option<f64>,
    pub renovation_costs: Option<f64>,
    pub monthly_rent: Option<f64>,
    /// Monthly P&I. Derived from the loan terms when omitted.
    pub mortgage_payment: Option<f64>,
    /// Annual
    pub property_tax: Option<f64>,
    /// Annual
    pub insurance: Option<f64>,
    /// Monthly
    pub maintenance_cost: Option<f64>,
    pub vacancy_rate: Option<f64>,
    pub management_fee: Option<f64>,
    pub is_flat_fee: Option<bool>,
    /// Monthly
    pub other_expenses: Option<f64>,
    pub interest_rate: Option<f64>,
    pub annual_appreciation: Option<f64>,
    pub holding_period: Option<f64>,
    pub loan_term: Option<f64>,
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

// ---------------------------------------------------------------------------
// Clamping
// ---------------------------------------------------------------------------

/// Clamp `value` into `[min, max]`. NaN and infinities collapse to `min`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    debug_assert!(min <= max, "clamp called with min {min} > max {max}");
    if !value.is_finite() {
        return min;
    }
    value.max(min).min(max)
}

pub fn clamp_percentage(value: f64) -> f64 {
    clamp(value, 0.0, 100.0)
}

pub fn clamp_non_negative(value: f64) -> f64 {
    clamp(value, 0.0, f64::INFINITY)
}

/// Guard a currency field and convert it to `Money`.
pub fn to_money(value: f64) -> Money {
    Decimal::from_f64(clamp(value, 0.0, MAX_AMOUNT)).unwrap_or(Decimal::ZERO)
}

/// Guard a percentage field and convert it to `Percent`.
pub fn to_percent(value: f64) -> Percent {
    Decimal::from_f64(clamp_percentage(value)).unwrap_or(Decimal::ZERO)
}

/// Guard a period field: whole years in `[1, MAX_YEARS]`.
pub fn to_years(value: f64) -> u32 {
    clamp(value, 1.0, MAX_YEARS as f64).round() as u32
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate the fields present in `input`. Absent fields are skipped; every
/// violated rule contributes one message, in field order.
pub fn validate_inputs(input: &RawCalculatorInput) -> ValidationResult {
    let mut errors = Vec::new();

    // Comparisons are written so that NaN fails every rule.
    if let Some(v) = input.property_value {
        if !(v > 0.0) {
            errors.push("Property value must be greater than 0".to_string());
        }
    }
    if let Some(v) = input.down_payment_percent {
        if !(0.0..=100.0).contains(&v) {
            errors.push("Down payment percent must be between 0 and 100".to_string());
        }
    }
    if let Some(v) = input.interest_rate {
        if !(v >= 0.0) {
            errors.push("Interest rate cannot be negative".to_string());
        }
    }
    if let Some(v) = input.loan_term {
        if !(v > 0.0) {
            errors.push("Loan term must be greater than 0".to_string());
        }
    }
    if let Some(v) = input.monthly_rent {
        if !(v >= 0.0) {
            errors.push("Monthly rent cannot be negative".to_string());
        }
    }
    if let Some(v) = input.vacancy_rate {
        if !(0.0..=100.0).contains(&v) {
            errors.push("Vacancy rate must be between 0 and 100".to_string());
        }
    }
    if let Some(v) = input.annual_appreciation {
        if !(0.0..=100.0).contains(&v) {
            errors.push("Annual appreciation must be between 0 and 100".to_string());
        }
    }
    if let Some(v) = input.holding_period {
        if !(v >= 1.0) {
            errors.push("Holding period must be at least 1 year".to_string());
        }
    }

    ValidationResult::from_errors(errors)
}

// ---------------------------------------------------------------------------
// Down payment sync
// ---------------------------------------------------------------------------

/// Down payment amount for a percentage of the property value.
pub fn down_payment_amount(property_value: Money, percent: Percent) -> Money {
    property_value * percent / dec!(100)
}

/// Down payment as a percentage of the property value. Zero value yields 0.
pub fn down_payment_percent(property_value: Money, amount: Money) -> Percent {
    if property_value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    amount / property_value * dec!(100)
}

// ---------------------------------------------------------------------------
// Sanitising
// ---------------------------------------------------------------------------

/// Turn raw form state into a fully guarded `CalculatorInput`.
///
/// Missing assumption fields come from `defaults`, missing amounts are zero.
/// The down payment is taken from the amount field when present, otherwise
/// from the percent field, and is capped at the property value. When no
/// mortgage payment is given it is derived from the loan terms.
pub fn sanitize(raw: &RawCalculatorInput, defaults: &CalculatorDefaults) -> CalculatorInput {
    let property_value = amount_field("property_value", raw.property_value);

    let down_payment_amount = match (raw.down_payment_amount, raw.down_payment_percent) {
        (Some(amount), _) => to_money(amount),
        (None, Some(pct)) => self::down_payment_amount(property_value, to_percent(pct)),
        (None, None) => {
            self::down_payment_amount(property_value, defaults.down_payment_percent)
        }
    }
    .min(property_value);
    let down_payment_percent = self::down_payment_percent(property_value, down_payment_amount);

    let interest_rate = percent_field("interest_rate", raw.interest_rate, Decimal::ZERO);
    let loan_term_years = raw.loan_term.map(to_years).unwrap_or(defaults.loan_term_years);

    let mortgage_payment = match raw.mortgage_payment {
        Some(v) => to_money(v),
        None => monthly_mortgage_payment(
            property_value - down_payment_amount,
            interest_rate,
            loan_term_years,
        ),
    };

    let is_flat_fee = raw.is_flat_fee.unwrap_or(defaults.is_flat_fee);

    CalculatorInput {
        property_value,
        down_payment_amount,
        down_payment_percent,
        closing_costs: amount_field("closing_costs", raw.closing_costs),
        renovation_costs: amount_field("renovation_costs", raw.renovation_costs),
        monthly_rent: amount_field("monthly_rent", raw.monthly_rent),
        mortgage_payment,
        property_tax: amount_field("property_tax", raw.property_tax),
        insurance: amount_field("insurance", raw.insurance),
        maintenance_cost: amount_field("maintenance_cost", raw.maintenance_cost),
        vacancy_rate: percent_field("vacancy_rate", raw.vacancy_rate, defaults.vacancy_rate),
        management_fee: if is_flat_fee {
            amount_field("management_fee", raw.management_fee)
        } else {
            percent_field("management_fee", raw.management_fee, defaults.management_fee)
        },
        is_flat_fee,
        other_expenses: amount_field("other_expenses", raw.other_expenses),
        interest_rate,
        annual_appreciation: percent_field(
            "annual_appreciation",
            raw.annual_appreciation,
            defaults.annual_appreciation,
        ),
        holding_period_years: raw
            .holding_period
            .map(to_years)
            .unwrap_or(defaults.holding_period_years),
        loan_term_years,
    }
}

fn amount_field(field: &str, value: Option<f64>) -> Money {
    let Some(v) = value else {
        return Decimal::ZERO;
    };
    let guarded = clamp(v, 0.0, MAX_AMOUNT);
    if guarded != v {
        debug!(field, raw = v, guarded, "amount clamped");
    }
    to_money(guarded)
}

fn percent_field(field: &str, value: Option<f64>, default: Percent) -> Percent {
    let Some(v) = value else {
        return default;
    };
    let guarded = clamp_percentage(v);
    if guarded != v {
        debug!(field, raw = v, guarded, "percentage clamped");
    }
    to_percent(guarded)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clamp_inside_range() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
    }

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp(-3.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(42.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn test_clamp_non_finite_returns_min() {
        assert_eq!(clamp(f64::NAN, 1.0, 10.0), 1.0);
        assert_eq!(clamp(f64::INFINITY, 1.0, 10.0), 1.0);
        assert_eq!(clamp(f64::NEG_INFINITY, 1.0, 10.0), 1.0);
    }

    #[test]
    fn test_clamp_percentage() {
        assert_eq!(clamp_percentage(150.0), 100.0);
        assert_eq!(clamp_percentage(-1.0), 0.0);
        assert_eq!(clamp_percentage(4.5), 4.5);
    }

    #[test]
    fn test_clamp_non_negative_is_unbounded_above() {
        assert_eq!(clamp_non_negative(1e300), 1e300);
        assert_eq!(clamp_non_negative(-0.01), 0.0);
    }

    #[test]
    fn test_to_money_and_years() {
        assert_eq!(to_money(1216.04), dec!(1216.04));
        assert_eq!(to_money(f64::NAN), Decimal::ZERO);
        assert_eq!(to_years(0.0), 1);
        assert_eq!(to_years(f64::NAN), 1);
        assert_eq!(to_years(4.6), 5);
        assert_eq!(to_years(1e9), MAX_YEARS);
    }

    #[test]
    fn test_validate_negative_property_value() {
        let input = RawCalculatorInput {
            property_value: Some(-10000.0),
            ..Default::default()
        };
        let result = validate_inputs(&input);
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["Property value must be greater than 0"]);
    }

    #[test]
    fn test_validate_valid_form() {
        let input = RawCalculatorInput {
            property_value: Some(300000.0),
            down_payment_percent: Some(20.0),
            interest_rate: Some(4.5),
            loan_term: Some(30.0),
            monthly_rent: Some(2000.0),
            ..Default::default()
        };
        let result = validate_inputs(&input);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_validate_collects_all_errors_in_order() {
        let input = RawCalculatorInput {
            property_value: Some(0.0),
            down_payment_percent: Some(120.0),
            interest_rate: Some(-1.0),
            loan_term: Some(0.0),
            ..Default::default()
        };
        let result = validate_inputs(&input);
        assert_eq!(
            result.errors,
            vec![
                "Property value must be greater than 0",
                "Down payment percent must be between 0 and 100",
                "Interest rate cannot be negative",
                "Loan term must be greater than 0",
            ]
        );
    }

    #[test]
    fn test_validate_empty_form_is_valid() {
        let result = validate_inputs(&RawCalculatorInput::default());
        assert!(result.is_valid);
    }

    #[test]
    fn test_validate_nan_fails() {
        let input = RawCalculatorInput {
            property_value: Some(f64::NAN),
            down_payment_percent: Some(f64::NAN),
            ..Default::default()
        };
        assert_eq!(validate_inputs(&input).errors.len(), 2);
    }

    #[test]
    fn test_down_payment_sync() {
        assert_eq!(down_payment_amount(dec!(300000), dec!(20)), dec!(60000));
        assert_eq!(down_payment_percent(dec!(300000), dec!(60000)), dec!(20));
        assert_eq!(down_payment_percent(Decimal::ZERO, dec!(60000)), Decimal::ZERO);
    }

    #[test]
    fn test_sanitize_uses_percent_when_amount_missing() {
        let raw = RawCalculatorInput {
            property_value: Some(300000.0),
            down_payment_percent: Some(25.0),
            ..Default::default()
        };
        let input = sanitize(&raw, &CalculatorDefaults::default());
        assert_eq!(input.down_payment_amount, dec!(75000));
        assert_eq!(input.down_payment_percent, dec!(25));
    }

    #[test]
    fn test_sanitize_caps_down_payment_at_value() {
        let raw = RawCalculatorInput {
            property_value: Some(100000.0),
            down_payment_amount: Some(250000.0),
            ..Default::default()
        };
        let input = sanitize(&raw, &CalculatorDefaults::default());
        assert_eq!(input.down_payment_amount, dec!(100000));
        assert_eq!(input.mortgage_payment, Decimal::ZERO);
    }

    #[test]
    fn test_sanitize_clamps_out_of_range_fields() {
        let raw = RawCalculatorInput {
            property_value: Some(f64::INFINITY),
            vacancy_rate: Some(250.0),
            closing_costs: Some(-500.0),
            holding_period: Some(0.0),
            ..Default::default()
        };
        let input = sanitize(&raw, &CalculatorDefaults::default());
        assert_eq!(input.property_value, Decimal::ZERO);
        assert_eq!(input.vacancy_rate, dec!(100));
        assert_eq!(input.closing_costs, Decimal::ZERO);
        assert_eq!(input.holding_period_years, 1);
    }

    #[test]
    fn test_sanitize_fills_defaults() {
        let defaults = CalculatorDefaults::default();
        let input = sanitize(&RawCalculatorInput::default(), &defaults);
        assert_eq!(input.loan_term_years, defaults.loan_term_years);
        assert_eq!(input.vacancy_rate, defaults.vacancy_rate);
        assert_eq!(input.holding_period_years, defaults.holding_period_years);
        assert!(!input.is_flat_fee);
    }

    #[test]
    fn test_sanitize_derives_mortgage_payment() {
        let raw = RawCalculatorInput {
            property_value: Some(300000.0),
            down_payment_amount: Some(60000.0),
            interest_rate: Some(4.5),
            loan_term: Some(30.0),
            ..Default::default()
        };
        let input = sanitize(&raw, &CalculatorDefaults::default());
        assert!((input.mortgage_payment - dec!(1216.04)).abs() < dec!(0.01));
    }
}
