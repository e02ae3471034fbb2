use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::amortization_schedule;
use crate::error::PropCalcError;
use crate::guard::{down_payment_amount, MAX_MONEY, MAX_YEARS};
use crate::primitives::percent_of;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::PropCalcResult;

/// Loan-to-value above which lenders charge private mortgage insurance.
const PMI_LTV_THRESHOLD: Decimal = dec!(80);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Mortgage calculator form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageInput {
    pub home_price: Money,
    pub down_payment_percent: Percent,
    /// Annual interest rate, e.g. 6.5 for 6.5%
    pub interest_rate: Percent,
    pub loan_term_years: u32,
    /// Annual
    #[serde(default)]
    pub property_tax: Money,
    /// Annual
    #[serde(default)]
    pub insurance: Money,
    /// Monthly
    #[serde(default)]
    pub hoa_fee: Money,
    /// Annual PMI premium as a percent of the original loan
    #[serde(default)]
    pub pmi_rate: Percent,
    /// First payment falls one month after this date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Monthly housing payment and lifetime loan cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageBreakdown {
    pub loan_amount: Money,
    pub down_payment: Money,
    pub loan_to_value: Percent,
    pub principal_and_interest: Money,
    pub monthly_property_tax: Money,
    pub monthly_insurance: Money,
    pub monthly_pmi: Money,
    pub monthly_hoa: Money,
    pub total_monthly_payment: Money,
    pub total_interest: Money,
    /// Principal plus interest over the full term
    pub total_of_payments: Money,
    /// Payment number after which the balance falls to 80% of the home price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmi_removal_month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Full monthly housing cost (PITI plus HOA and PMI) for a fixed-rate loan.
pub fn calculate_mortgage(
    input: &MortgageInput,
) -> PropCalcResult<ComputationOutput<MortgageBreakdown>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let down_payment = down_payment_amount(input.home_price, input.down_payment_percent);
    let loan_amount = input.home_price - down_payment;
    let loan_to_value = percent_of(loan_amount, input.home_price);

    let schedule = amortization_schedule(
        loan_amount,
        input.interest_rate,
        input.loan_term_years,
        input.start_date,
    );

    // --- PMI while LTV exceeds 80% ---
    let needs_pmi = loan_to_value > PMI_LTV_THRESHOLD;
    let monthly_pmi = if needs_pmi {
        loan_amount * input.pmi_rate / dec!(100) / dec!(12)
    } else {
        Decimal::ZERO
    };
    let pmi_removal_month = if needs_pmi {
        let threshold = input.home_price * PMI_LTV_THRESHOLD / dec!(100);
        schedule
            .rows
            .iter()
            .find(|row| row.balance <= threshold)
            .map(|row| row.month)
    } else {
        None
    };

    if needs_pmi && input.pmi_rate.is_zero() {
        warnings.push(format!(
            "LTV of {:.1}% exceeds 80% but no PMI rate was given; lenders typically require PMI",
            loan_to_value
        ));
    }
    if input.interest_rate > dec!(12) {
        warnings.push(format!(
            "Interest rate {}% is well above typical mortgage rates",
            input.interest_rate
        ));
    }

    let monthly_property_tax = input.property_tax / dec!(12);
    let monthly_insurance = input.insurance / dec!(12);
    let total_monthly_payment = schedule.monthly_payment
        + monthly_property_tax
        + monthly_insurance
        + monthly_pmi
        + input.hoa_fee;

    let output = MortgageBreakdown {
        loan_amount,
        down_payment,
        loan_to_value,
        principal_and_interest: schedule.monthly_payment,
        monthly_property_tax,
        monthly_insurance,
        monthly_pmi,
        monthly_hoa: input.hoa_fee,
        total_monthly_payment,
        total_interest: schedule.total_interest,
        total_of_payments: schedule.total_paid,
        pmi_removal_month,
        payoff_date: schedule.payoff_date,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Fixed-Rate Mortgage Payment (PITI)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &MortgageInput) -> PropCalcResult<()> {
    if input.home_price <= Decimal::ZERO || input.home_price > MAX_MONEY {
        return Err(PropCalcError::InvalidInput {
            field: "home_price".into(),
            reason: format!("Home price must be positive and at most {MAX_MONEY}"),
        });
    }

    if input.down_payment_percent < Decimal::ZERO || input.down_payment_percent > dec!(100) {
        return Err(PropCalcError::InvalidInput {
            field: "down_payment_percent".into(),
            reason: "Down payment percent must be between 0 and 100".into(),
        });
    }

    if input.pmi_rate < Decimal::ZERO || input.pmi_rate > dec!(100) {
        return Err(PropCalcError::InvalidInput {
            field: "pmi_rate".into(),
            reason: "PMI rate must be between 0 and 100".into(),
        });
    }

    if input.interest_rate < Decimal::ZERO || input.interest_rate > dec!(100) {
        return Err(PropCalcError::InvalidInput {
            field: "interest_rate".into(),
            reason: "Interest rate must be between 0 and 100".into(),
        });
    }

    if input.loan_term_years == 0 || input.loan_term_years > MAX_YEARS {
        return Err(PropCalcError::InvalidInput {
            field: "loan_term_years".into(),
            reason: format!("Loan term must be between 1 and {MAX_YEARS} years"),
        });
    }

    let out_of_range = [
        ("property_tax", input.property_tax),
        ("insurance", input.insurance),
        ("hoa_fee", input.hoa_fee),
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
