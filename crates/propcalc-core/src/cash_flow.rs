use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PropCalcError;
use crate::guard::MAX_MONEY;
use crate::primitives::{cash_flow, management_cost, percent_of, vacancy_loss};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::PropCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Rental cash-flow calculator form. Amounts are monthly unless noted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowInput {
    pub purchase_price: Money,
    /// Down payment plus closing and renovation costs
    pub cash_invested: Money,
    pub monthly_rent: Money,
    /// Parking, laundry, storage
    #[serde(default)]
    pub other_income: Money,
    #[serde(default)]
    pub vacancy_rate: Percent,
    /// Annual
    #[serde(default)]
    pub property_tax: Money,
    /// Annual
    #[serde(default)]
    pub insurance: Money,
    #[serde(default)]
    pub maintenance: Money,
    #[serde(default)]
    pub management_fee: Decimal,
    #[serde(default)]
    pub is_flat_fee: bool,
    #[serde(default)]
    pub other_expenses: Money,
    /// Principal and interest
    #[serde(default)]
    pub mortgage_payment: Money,
}

/// Monthly operating expenses, excluding debt service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingExpenses {
    pub property_tax: Money,
    pub insurance: Money,
    pub maintenance: Money,
    pub management: Money,
    pub other: Money,
    pub total: Money,
}

/// Income, NOI and leveraged return for a rental.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowAnalysis {
    pub gross_monthly_income: Money,
    pub vacancy_loss: Money,
    pub effective_gross_income: Money,
    pub operating_expenses: OperatingExpenses,
    pub monthly_noi: Money,
    pub annual_noi: Money,
    /// Annual NOI / purchase price
    pub cap_rate: Percent,
    pub mortgage_payment: Money,
    pub monthly_cash_flow: Money,
    pub annual_cash_flow: Money,
    /// Annual cash flow / cash invested
    pub cash_on_cash_return: Percent,
    /// Operating expenses / effective gross income
    pub expense_ratio: Percent,
    /// Annual NOI / annual debt service; absent for an unlevered property
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dscr: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Analyse monthly and annual cash flow for a rental property.
pub fn analyze_cash_flow(
    input: &CashFlowInput,
) -> PropCalcResult<ComputationOutput<CashFlowAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    // --- Income ---
    let gross_monthly_income = input.monthly_rent + input.other_income;
    let vacancy = vacancy_loss(input.monthly_rent, input.vacancy_rate);
    let effective_gross_income = gross_monthly_income - vacancy;

    // --- Expenses ---
    let management = management_cost(input.monthly_rent, input.management_fee, input.is_flat_fee);
    let property_tax = input.property_tax / dec!(12);
    let insurance = input.insurance / dec!(12);
    let total = property_tax + insurance + input.maintenance + management + input.other_expenses;
    let operating_expenses = OperatingExpenses {
        property_tax,
        insurance,
        maintenance: input.maintenance,
        management,
        other: input.other_expenses,
        total,
    };

    // --- NOI and returns ---
    let monthly_noi = effective_gross_income - total;
    let annual_noi = monthly_noi * dec!(12);
    let monthly_cash_flow = cash_flow(effective_gross_income, total, input.mortgage_payment);
    let annual_cash_flow = monthly_cash_flow * dec!(12);

    let cap_rate = percent_of(annual_noi, input.purchase_price);

    let cash_on_cash_return = if input.cash_invested.is_zero() {
        warnings.push("No cash invested; cash-on-cash return reported as 0%".into());
        Decimal::ZERO
    } else {
        percent_of(annual_cash_flow, input.cash_invested)
    };

    let expense_ratio = percent_of(total, effective_gross_income);

    let annual_debt_service = input.mortgage_payment * dec!(12);
    let dscr = if annual_debt_service.is_zero() {
        None
    } else {
        let ratio = annual_noi.checked_div(annual_debt_service);
        if ratio.is_none() {
            warnings.push(
                "Debt service is negligible next to NOI; DSCR is out of range and omitted".into(),
            );
        }
        ratio
    };

    // --- Warnings ---
    if monthly_cash_flow < Decimal::ZERO {
        warnings.push(format!(
            "Negative monthly cash flow of {}",
            monthly_cash_flow.round_dp(2)
        ));
    }
    if let Some(d) = dscr {
        if d < dec!(1.2) {
            warnings.push(format!(
                "DSCR of {d:.2} is below 1.20x — lender covenant risk"
            ));
        }
    }
    if cap_rate > Decimal::ZERO && cap_rate < dec!(3) {
        warnings.push(format!(
            "Cap rate {cap_rate:.2}% is below 3% — unusually low for a rental"
        ));
    }
    if input.vacancy_rate > dec!(15) {
        warnings.push(format!(
            "Vacancy rate {:.1}% exceeds 15% — above typical market norms",
            input.vacancy_rate
        ));
    }

    let output = CashFlowAnalysis {
        gross_monthly_income,
        vacancy_loss: vacancy,
        effective_gross_income,
        operating_expenses,
        monthly_noi,
        annual_noi,
        cap_rate,
        mortgage_payment: input.mortgage_payment,
        monthly_cash_flow,
        annual_cash_flow,
        cash_on_cash_return,
        expense_ratio,
        dscr,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Rental Cash Flow Analysis (NOI, Cap Rate, Cash-on-Cash)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &CashFlowInput) -> PropCalcResult<()> {
    if input.purchase_price <= Decimal::ZERO {
        return Err(PropCalcError::InvalidInput {
            field: "purchase_price".into(),
            reason: "Purchase price must be positive".into(),
        });
    }

    if input.vacancy_rate < Decimal::ZERO || input.vacancy_rate > dec!(100) {
        return Err(PropCalcError::InvalidInput {
            field: "vacancy_rate".into(),
            reason: "Vacancy rate must be between 0 and 100".into(),
        });
    }

    if !input.is_flat_fee && input.management_fee > dec!(100) {
        return Err(PropCalcError::InvalidInput {
            field: "management_fee".into(),
            reason: "Percentage management fee cannot exceed 100".into(),
        });
    }

    let out_of_range = [
        ("purchase_price", input.purchase_price),
        ("cash_invested", input.cash_invested),
        ("monthly_rent", input.monthly_rent),
        ("other_income", input.other_income),
        ("property_tax", input.property_tax),
        ("insurance", input.insurance),
        ("maintenance", input.maintenance),
        ("management_fee", input.management_fee),
        ("other_expenses", input.other_expenses),
        ("mortgage_payment", input.mortgage_payment),
    ]
    .into_iter()
    .find(|(_, v)| *v < Decimal::ZERO || *v > MAX_MONEY);

    if let Some((field, _)) = out_of_range {
        return Err(PropCalcError::InvalidInput {
            field: field.into(),
            reason: format!("Must be between 0 and {MAX_MONEY}"),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Duplex bought for $400k with $100k cash in.
    fn sample_input() -> CashFlowInput {
        CashFlowInput {
            purchase_price: dec!(400000),
            cash_invested: dec!(100000),
            monthly_rent: dec!(3600),
            other_income: dec!(100),
            vacancy_rate: dec!(5),
            property_tax: dec!(4800),
            insurance: dec!(1800),
            maintenance: dec!(200),
            management_fee: dec!(10),
            is_flat_fee: false,
            other_expenses: dec!(50),
            mortgage_payment: dec!(1800),
        }
    }

    #[test]
    fn test_income_lines() {
        let out = analyze_cash_flow(&sample_input()).unwrap().result;
        assert_eq!(out.gross_monthly_income, dec!(3700));
        assert_eq!(out.vacancy_loss, dec!(180));
        assert_eq!(out.effective_gross_income, dec!(3520));
    }

    #[test]
    fn test_expense_breakdown() {
        let out = analyze_cash_flow(&sample_input()).unwrap().result;
        let opex = &out.operating_expenses;
        assert_eq!(opex.property_tax, dec!(400));
        assert_eq!(opex.insurance, dec!(150));
        assert_eq!(opex.management, dec!(360));
        // 400 + 150 + 200 + 360 + 50
        assert_eq!(opex.total, dec!(1160));
    }

    #[test]
    fn test_noi_and_cap_rate() {
        let out = analyze_cash_flow(&sample_input()).unwrap().result;
        assert_eq!(out.monthly_noi, dec!(2360));
        assert_eq!(out.annual_noi, dec!(28320));
        // 28320 / 400000 = 7.08%
        assert_eq!(out.cap_rate, dec!(7.08));
    }

    #[test]
    fn test_cash_flow_and_cash_on_cash() {
        let out = analyze_cash_flow(&sample_input()).unwrap().result;
        assert_eq!(out.monthly_cash_flow, dec!(560));
        assert_eq!(out.annual_cash_flow, dec!(6720));
        assert_eq!(out.cash_on_cash_return, dec!(6.72));
    }

    #[test]
    fn test_dscr() {
        let out = analyze_cash_flow(&sample_input()).unwrap().result;
        // 28320 / 21600
        let dscr = out.dscr.unwrap();
        assert!((dscr - dec!(1.3111)).abs() < dec!(0.001));
    }

    #[test]
    fn test_unlevered_has_no_dscr() {
        let input = CashFlowInput {
            mortgage_payment: Decimal::ZERO,
            ..sample_input()
        };
        let out = analyze_cash_flow(&input).unwrap().result;
        assert!(out.dscr.is_none());
        assert_eq!(out.monthly_cash_flow, out.monthly_noi);
    }

    #[test]
    fn test_negative_cash_flow_warns() {
        let input = CashFlowInput {
            mortgage_payment: dec!(3000),
            ..sample_input()
        };
        let output = analyze_cash_flow(&input).unwrap();
        assert!(output.result.monthly_cash_flow < Decimal::ZERO);
        assert!(output.warnings.iter().any(|w| w.contains("Negative monthly cash flow")));
        assert!(output.warnings.iter().any(|w| w.contains("DSCR")));
    }

    #[test]
    fn test_zero_cash_invested() {
        let input = CashFlowInput {
            cash_invested: Decimal::ZERO,
            ..sample_input()
        };
        let output = analyze_cash_flow(&input).unwrap();
        assert_eq!(output.result.cash_on_cash_return, Decimal::ZERO);
        assert!(!output.warnings.is_empty());
    }

    #[test]
    fn test_flat_management_fee() {
        let input = CashFlowInput {
            management_fee: dec!(250),
            is_flat_fee: true,
            ..sample_input()
        };
        let out = analyze_cash_flow(&input).unwrap().result;
        assert_eq!(out.operating_expenses.management, dec!(250));
    }

    #[test]
    fn test_invalid_inputs() {
        let zero_price = CashFlowInput {
            purchase_price: Decimal::ZERO,
            ..sample_input()
        };
        assert!(analyze_cash_flow(&zero_price).is_err());

        let bad_vacancy = CashFlowInput {
            vacancy_rate: dec!(120),
            ..sample_input()
        };
        assert!(analyze_cash_flow(&bad_vacancy).is_err());
    }

    #[test]
    fn test_negligible_debt_service_omits_dscr() {
        let input = CashFlowInput {
            monthly_rent: dec!(1000000000),
            mortgage_payment: Decimal::new(1, 28),
            ..sample_input()
        };
        let output = analyze_cash_flow(&input).unwrap();
        assert!(output.result.dscr.is_none());
        assert!(output.warnings.iter().any(|w| w.contains("DSCR is out of range")));
    }
}
