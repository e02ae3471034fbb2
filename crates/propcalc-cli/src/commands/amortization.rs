use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use propcalc_core::amortization::{self, AmortizationInput};
use propcalc_core::config::CalculatorDefaults;

use crate::input;

/// Arguments for the amortisation schedule
#[derive(Args)]
pub struct AmortizationArgs {
    /// Amount borrowed
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Annual interest rate (e.g. 4.5 for 4.5%)
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Loan term in years (default from config)
    #[arg(long)]
    pub loan_term: Option<u32>,

    /// Loan start date (YYYY-MM-DD); rows are dated when given
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Print only the payment rows
    #[arg(long)]
    pub rows: bool,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_amortization(
    args: AmortizationArgs,
    defaults: &CalculatorDefaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: AmortizationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        AmortizationInput {
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            interest_rate: args
                .interest_rate
                .ok_or("--interest-rate is required (or provide --input)")?,
            loan_term_years: args.loan_term.unwrap_or(defaults.loan_term_years),
            start_date: args.start_date,
        }
    };

    let output = amortization::generate_schedule(&schedule_input)?;

    if args.rows {
        return Ok(serde_json::to_value(output.result.rows)?);
    }
    Ok(serde_json::to_value(output)?)
}
