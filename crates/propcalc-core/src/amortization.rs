use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PropCalcError;
use crate::guard::{MAX_MONEY, MAX_YEARS};
use crate::primitives::{monthly_mortgage_payment, monthly_rate};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::PropCalcResult;

/// Amortisation term assumed when a caller has no loan term of its own.
pub const DEFAULT_TERM_YEARS: u32 = 30;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One monthly payment split into interest and principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based payment number
    pub month: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    /// Balance after this payment
    pub balance: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Full payment schedule for a fixed-rate loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub loan_amount: Money,
    pub monthly_payment: Money,
    pub total_paid: Money,
    pub total_interest: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    pub rows: Vec<AmortizationRow>,
}

/// Amortisation schedule request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub loan_amount: Money,
    /// Annual interest rate, e.g. 4.5 for 4.5%
    pub interest_rate: Percent,
    #[serde(default = "default_term_years")]
    pub loan_term_years: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

fn default_term_years() -> u32 {
    DEFAULT_TERM_YEARS
}

// ---------------------------------------------------------------------------
// Remaining balance
// ---------------------------------------------------------------------------

/// Outstanding balance after `elapsed_years` of scheduled payments.
///
/// Walks the schedule month by month so the figure matches a lender
/// statement. The result is not clamped: payoff overshoot can leave a
/// fraction of a cent below zero. Elapsed time past the term stops at the
/// term.
pub fn remaining_balance(
    loan_amount: Money,
    annual_rate_percent: Percent,
    total_years: u32,
    elapsed_years: u32,
) -> Money {
    if loan_amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if total_years == 0 {
        return loan_amount;
    }

    let r = monthly_rate(annual_rate_percent);
    let payment = monthly_mortgage_payment(loan_amount, annual_rate_percent, total_years);
    let payments_made = elapsed_years.min(total_years) * 12;

    if r.is_zero() {
        // Straight-line amortisation
        return loan_amount - payment * Decimal::from(payments_made);
    }

    let mut balance = loan_amount;
    for _ in 0..payments_made {
        let interest = balance.saturating_mul(r);
        let principal_payment = payment.saturating_sub(interest);
        balance = balance.saturating_sub(principal_payment);
    }

    balance
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Build the month-by-month schedule. The final payment absorbs any rounding
/// residue so the loan closes at exactly zero. With a `start_date`, payment
/// `m` falls `m` months after it (clamped to month end).
pub fn amortization_schedule(
    loan_amount: Money,
    annual_rate_percent: Percent,
    years: u32,
    start_date: Option<NaiveDate>,
) -> AmortizationSchedule {
    let payment = monthly_mortgage_payment(loan_amount, annual_rate_percent, years);
    if payment.is_zero() {
        return AmortizationSchedule {
            loan_amount,
            monthly_payment: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            payoff_date: None,
            rows: Vec::new(),
        };
    }

    let r = monthly_rate(annual_rate_percent);
    let total_months = years * 12;
    let mut rows = Vec::with_capacity(total_months as usize);
    let mut balance = loan_amount;
    let mut total_paid = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;

    for month in 1..=total_months {
        let interest = balance.saturating_mul(r);
        let (principal, this_payment) = if month == total_months {
            (balance, balance.saturating_add(interest))
        } else {
            (payment.saturating_sub(interest), payment)
        };
        balance = balance.saturating_sub(principal);
        total_paid = total_paid.saturating_add(this_payment);
        total_interest = total_interest.saturating_add(interest);

        rows.push(AmortizationRow {
            month,
            payment: this_payment,
            interest,
            principal,
            balance,
            date: start_date.and_then(|d| d.checked_add_months(Months::new(month))),
        });
    }

    let payoff_date = rows.last().and_then(|row| row.date);

    AmortizationSchedule {
        loan_amount,
        monthly_payment: payment,
        total_paid,
        total_interest,
        payoff_date,
        rows,
    }
}

/// Validate a schedule request and build it inside the standard envelope.
pub fn generate_schedule(
    input: &AmortizationInput,
) -> PropCalcResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();

    if input.loan_amount <= Decimal::ZERO || input.loan_amount > MAX_MONEY {
        return Err(PropCalcError::InvalidInput {
            field: "loan_amount".into(),
            reason: format!("Loan amount must be greater than 0 and at most {MAX_MONEY}"),
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

    let schedule = amortization_schedule(
        input.loan_amount,
        input.interest_rate,
        input.loan_term_years,
        input.start_date,
    );

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Fixed-Rate Amortisation Schedule",
        input,
        Vec::new(),
        elapsed,
        schedule,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
