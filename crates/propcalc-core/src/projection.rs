use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::amortization::remaining_balance;
use crate::config::CalculatorDefaults;
use crate::error::PropCalcError;
use crate::guard::{sanitize, validate_inputs, RawCalculatorInput};
use crate::primitives::{
    annualized_return, cash_flow, compound_appreciation, management_cost, percent_of,
    vacancy_loss,
};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::PropCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Guarded inputs for a buy-and-hold rental projection. Built by
/// `guard::sanitize`; every percentage is in `[0, 100]`, every amount is
/// non-negative and both periods are at least one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorInput {
    pub property_value: Money,
    pub down_payment_amount: Money,
    pub down_payment_percent: Percent,
    pub closing_costs: Money,
    pub renovation_costs: Money,
    pub monthly_rent: Money,
    /// Monthly principal and interest
    pub mortgage_payment: Money,
    /// Annual
    pub property_tax: Money,
    /// Annual
    pub insurance: Money,
    /// Monthly
    pub maintenance_cost: Money,
    pub vacancy_rate: Percent,
    /// Flat monthly amount when `is_flat_fee`, otherwise percent of rent
    pub management_fee: Decimal,
    pub is_flat_fee: bool,
    /// Monthly
    pub other_expenses: Money,
    pub interest_rate: Percent,
    pub annual_appreciation: Percent,
    pub holding_period_years: u32,
    /// Amortisation term used for the balance owed at sale
    pub loan_term_years: u32,
}

/// Outcome of a projection over the holding period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorResult {
    pub total_investment: Money,
    pub monthly_cash_flow: Money,
    pub annual_cash_flow: Money,
    pub total_cash_flow: Money,
    pub property_value_at_sale: Money,
    pub equity_at_sale: Money,
    pub total_roi: Percent,
    pub annualized_roi: Percent,
}

/// Position at the end of one year of the holding period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionYear {
    pub year: u32,
    pub property_value: Money,
    pub loan_balance: Money,
    pub equity: Money,
    pub cumulative_cash_flow: Money,
    /// Equity gained plus cumulative cash flow
    pub total_profit: Money,
    pub total_roi: Percent,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project a buy-and-hold investment to the end of its holding period.
///
/// Pure: identical input always yields an identical result. Rent and
/// expenses are held flat over the period; the property appreciates at a
/// compound annual rate and the loan amortises over `loan_term_years`.
pub fn project(input: &CalculatorInput) -> CalculatorResult {
    let holding = input.holding_period_years.max(1);
    let total_investment = total_investment(input);
    let monthly_cash_flow = monthly_cash_flow(input);
    let annual_cash_flow = monthly_cash_flow * dec!(12);
    let year = snapshot_at(input, holding, total_investment, annual_cash_flow);

    CalculatorResult {
        total_investment,
        monthly_cash_flow,
        annual_cash_flow,
        total_cash_flow: year.cumulative_cash_flow,
        property_value_at_sale: year.property_value,
        equity_at_sale: year.equity,
        total_roi: year.total_roi,
        annualized_roi: annualized_return(year.total_roi, holding),
    }
}

/// Year-by-year positions for years `1..=holding_period_years`. The final
/// entry agrees with `project`.
pub fn project_timeline(input: &CalculatorInput) -> Vec<ProjectionYear> {
    let holding = input.holding_period_years.max(1);
    let total_investment = total_investment(input);
    let annual_cash_flow = monthly_cash_flow(input) * dec!(12);

    (1..=holding)
        .map(|year| snapshot_at(input, year, total_investment, annual_cash_flow))
        .collect()
}

/// Monthly operating costs: tax and insurance spread monthly, maintenance,
/// vacancy allowance, management and other expenses.
pub fn monthly_expenses(input: &CalculatorInput) -> Money {
    input.property_tax / dec!(12)
        + input.insurance / dec!(12)
        + input.maintenance_cost
        + vacancy_loss(input.monthly_rent, input.vacancy_rate)
        + management_cost(input.monthly_rent, input.management_fee, input.is_flat_fee)
        + input.other_expenses
}

/// Validate raw form state, guard it, and run the projection.
///
/// Returns `PropCalcError::Validation` with every violated rule when the form
/// is invalid, and `InvalidInput` when no property value was entered.
pub fn analyze_investment(
    raw: &RawCalculatorInput,
    defaults: &CalculatorDefaults,
) -> PropCalcResult<ComputationOutput<CalculatorResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let input = checked_input(raw, defaults)?;
    let result = project(&input);
    collect_warnings(&input, &result, &mut warnings);

    debug!(
        total_roi = %result.total_roi,
        annualized_roi = %result.annualized_roi,
        warnings = warnings.len(),
        "investment projection complete"
    );

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Buy-and-Hold Rental Investment Projection",
        &input,
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Year-by-year timeline for raw form state, behind the same checks as
/// [`analyze_investment`].
pub fn analyze_timeline(
    raw: &RawCalculatorInput,
    defaults: &CalculatorDefaults,
) -> PropCalcResult<Vec<ProjectionYear>> {
    let input = checked_input(raw, defaults)?;
    Ok(project_timeline(&input))
}

/// Validate the form, require a purchase price, then sanitize.
fn checked_input(
    raw: &RawCalculatorInput,
    defaults: &CalculatorDefaults,
) -> PropCalcResult<CalculatorInput> {
    let validation = validate_inputs(raw);
    if !validation.is_valid {
        return Err(PropCalcError::Validation(validation.errors));
    }
    if raw.property_value.is_none() {
        return Err(PropCalcError::InvalidInput {
            field: "property_value".into(),
            reason: "Property value is required for an investment projection".into(),
        });
    }
    Ok(sanitize(raw, defaults))
}

fn total_investment(input: &CalculatorInput) -> Money {
    input.down_payment_amount + input.closing_costs + input.renovation_costs
}

fn monthly_cash_flow(input: &CalculatorInput) -> Money {
    cash_flow(
        input.monthly_rent,
        monthly_expenses(input),
        input.mortgage_payment,
    )
}

fn snapshot_at(
    input: &CalculatorInput,
    year: u32,
    total_investment: Money,
    annual_cash_flow: Money,
) -> ProjectionYear {
    let property_value = compound_appreciation(input.property_value, input.annual_appreciation, year);
    let loan_amount = input.property_value - input.down_payment_amount;
    let loan_balance = remaining_balance(
        loan_amount,
        input.interest_rate,
        input.loan_term_years,
        year,
    );
    let equity = property_value.saturating_sub(loan_balance);
    let cumulative_cash_flow = annual_cash_flow * Decimal::from(year);
    let total_profit = equity
        .saturating_sub(input.down_payment_amount)
        .saturating_add(cumulative_cash_flow);

    ProjectionYear {
        year,
        property_value,
        loan_balance,
        equity,
        cumulative_cash_flow,
        total_profit,
        total_roi: percent_of(total_profit, total_investment),
    }
}

fn collect_warnings(input: &CalculatorInput, result: &CalculatorResult, warnings: &mut Vec<String>) {
    if result.total_investment.is_zero() {
        warnings.push("Total investment is zero; ROI is undefined and reported as 0%".into());
    } else if result.total_roi.is_zero() {
        let profit = result
            .equity_at_sale
            .saturating_sub(input.down_payment_amount)
            .saturating_add(result.total_cash_flow);
        if !profit.is_zero() {
            warnings.push(
                "Return exceeds the representable range; ROI reported as 0%".into(),
            );
        }
    }

    if result.monthly_cash_flow < Decimal::ZERO {
        warnings.push(format!(
            "Negative monthly cash flow of {} — the property does not carry itself",
            result.monthly_cash_flow.round_dp(2)
        ));
    }

    if result.total_roi <= dec!(-100) {
        warnings.push(
            "Losses exceed the amount invested; annualized ROI floored at -100%".into(),
        );
    }

    if input.vacancy_rate > dec!(15) {
        warnings.push(format!(
            "Vacancy rate {:.1}% exceeds 15% — above typical market norms",
            input.vacancy_rate
        ));
    }

    if input.holding_period_years > input.loan_term_years {
        warnings.push(format!(
            "Holding period of {} years outlasts the {}-year loan term",
            input.holding_period_years, input.loan_term_years
        ));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Reference scenario: $300k single-family rental, 20% down, 5-year hold.
    fn sample_input() -> CalculatorInput {
        CalculatorInput {
            property_value: dec!(300000),
            down_payment_amount: dec!(60000),
            down_payment_percent: dec!(20),
            closing_costs: dec!(6000),
            renovation_costs: Decimal::ZERO,
            monthly_rent: dec!(2200),
            mortgage_payment: dec!(1216.04),
            property_tax: dec!(3000),
            insurance: dec!(1200),
            maintenance_cost: dec!(100),
            vacancy_rate: dec!(5),
            management_fee: dec!(8),
            is_flat_fee: false,
            other_expenses: Decimal::ZERO,
            interest_rate: dec!(4.5),
            annual_appreciation: dec!(3),
            holding_period_years: 5,
            loan_term_years: 30,
        }
    }

    #[test]
    fn test_total_investment() {
        assert_eq!(project(&sample_input()).total_investment, dec!(66000));
    }

    #[test]
    fn test_monthly_expenses_breakdown() {
        // 250 tax + 100 insurance + 100 maintenance + 110 vacancy + 176 mgmt
        assert_eq!(monthly_expenses(&sample_input()), dec!(736));
    }

    #[test]
    fn test_flat_management_fee() {
        let input = CalculatorInput {
            management_fee: dec!(150),
            is_flat_fee: true,
            ..sample_input()
        };
        assert_eq!(monthly_expenses(&input), dec!(710));
    }

    #[test]
    fn test_cash_flows() {
        let result = project(&sample_input());
        assert_eq!(result.monthly_cash_flow, dec!(247.96));
        assert_eq!(result.annual_cash_flow, dec!(2975.52));
        assert_eq!(result.total_cash_flow, dec!(14877.60));
    }

    #[test]
    fn test_sale_value_and_equity() {
        let result = project(&sample_input());
        assert!((result.property_value_at_sale - dec!(347782.22229)).abs() < dec!(0.00001));
        assert!(
            (result.equity_at_sale - dec!(129003.22)).abs() < dec!(0.01),
            "got {}",
            result.equity_at_sale
        );
    }

    #[test]
    fn test_roi_figures() {
        let result = project(&sample_input());
        assert!((result.total_roi - dec!(127.0922)).abs() < dec!(0.001), "got {}", result.total_roi);
        assert!(
            (result.annualized_roi - dec!(17.8258)).abs() < dec!(0.001),
            "got {}",
            result.annualized_roi
        );
    }

    #[test]
    fn test_project_is_pure() {
        let input = sample_input();
        assert_eq!(project(&input), project(&input));
    }

    #[test]
    fn test_zero_investment_reports_zero_roi() {
        let input = CalculatorInput {
            down_payment_amount: Decimal::ZERO,
            closing_costs: Decimal::ZERO,
            ..sample_input()
        };
        let result = project(&input);
        assert_eq!(result.total_investment, Decimal::ZERO);
        assert_eq!(result.total_roi, Decimal::ZERO);
        assert_eq!(result.annualized_roi, Decimal::ZERO);
    }

    #[test]
    fn test_deep_loss_floors_annualized_roi() {
        let input = CalculatorInput {
            monthly_rent: Decimal::ZERO,
            annual_appreciation: Decimal::ZERO,
            mortgage_payment: dec!(5000),
            ..sample_input()
        };
        let result = project(&input);
        assert!(result.total_roi < dec!(-100));
        assert_eq!(result.annualized_roi, dec!(-100));
    }

    #[test]
    fn test_loan_term_is_honoured() {
        let fifteen = CalculatorInput {
            loan_term_years: 15,
            ..sample_input()
        };
        // Faster amortisation leaves more equity at sale
        assert!(project(&fifteen).equity_at_sale > project(&sample_input()).equity_at_sale);
    }

    #[test]
    fn test_timeline_ends_at_projection() {
        let input = sample_input();
        let timeline = project_timeline(&input);
        let result = project(&input);
        assert_eq!(timeline.len(), 5);
        let last = timeline.last().unwrap();
        assert_eq!(last.equity, result.equity_at_sale);
        assert_eq!(last.total_roi, result.total_roi);
        assert_eq!(last.cumulative_cash_flow, result.total_cash_flow);
    }

    #[test]
    fn test_timeline_balance_declines() {
        let timeline = project_timeline(&sample_input());
        for pair in timeline.windows(2) {
            assert!(pair[1].loan_balance < pair[0].loan_balance);
            assert!(pair[1].property_value > pair[0].property_value);
        }
    }

    #[test]
    fn test_analyze_rejects_invalid_form() {
        let raw = RawCalculatorInput {
            property_value: Some(-1.0),
            interest_rate: Some(-2.0),
            ..Default::default()
        };
        match analyze_investment(&raw, &CalculatorDefaults::default()) {
            Err(PropCalcError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_unrepresentable_roi_is_flagged() {
        let input = CalculatorInput {
            property_value: dec!(1000000000000),
            down_payment_amount: dec!(0.01),
            closing_costs: Decimal::ZERO,
            annual_appreciation: dec!(100),
            holding_period_years: 50,
            ..sample_input()
        };
        let result = project(&input);
        assert_eq!(result.total_roi, Decimal::ZERO);

        let mut warnings = Vec::new();
        collect_warnings(&input, &result, &mut warnings);
        assert!(
            warnings.iter().any(|w| w.contains("representable range")),
            "got {warnings:?}"
        );
    }

    #[test]
    fn test_ordinary_roi_is_not_flagged() {
        let result = project(&sample_input());
        let mut warnings = Vec::new();
        collect_warnings(&sample_input(), &result, &mut warnings);
        assert!(!warnings.iter().any(|w| w.contains("representable range")));
    }

    #[test]
    fn test_analyze_timeline_requires_property_value() {
        let raw = RawCalculatorInput {
            monthly_rent: Some(2000.0),
            ..Default::default()
        };
        match analyze_timeline(&raw, &CalculatorDefaults::default()) {
            Err(PropCalcError::InvalidInput { field, .. }) => assert_eq!(field, "property_value"),
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[test]
    fn test_analyze_timeline_covers_holding_period() {
        let raw = RawCalculatorInput {
            property_value: Some(300000.0),
            monthly_rent: Some(2200.0),
            holding_period: Some(7.0),
            ..Default::default()
        };
        let timeline = analyze_timeline(&raw, &CalculatorDefaults::default()).unwrap();
        assert_eq!(timeline.len(), 7);
    }

    #[test]
    fn test_analyze_requires_property_value() {
        let raw = RawCalculatorInput {
            monthly_rent: Some(2000.0),
            ..Default::default()
        };
        let err = analyze_investment(&raw, &CalculatorDefaults::default()).unwrap_err();
        assert!(matches!(err, PropCalcError::InvalidInput { .. }));
    }

    #[test]
    fn test_analyze_negative_cash_flow_warning() {
        let raw = RawCalculatorInput {
            property_value: Some(500000.0),
            down_payment_percent: Some(10.0),
            interest_rate: Some(7.0),
            monthly_rent: Some(1500.0),
            ..Default::default()
        };
        let output = analyze_investment(&raw, &CalculatorDefaults::default()).unwrap();
        assert!(output.result.monthly_cash_flow < Decimal::ZERO);
        assert!(output.warnings.iter().any(|w| w.contains("Negative monthly cash flow")));
        assert_eq!(output.methodology, "Buy-and-Hold Rental Investment Projection");
    }
}
