use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use propcalc_core::config::CalculatorDefaults;
use propcalc_core::mortgage::{self, MortgageInput};

use crate::input;

/// Arguments for the mortgage payment calculator
#[derive(Args)]
pub struct MortgageArgs {
    /// Purchase price of the home
    #[arg(long)]
    pub home_price: Option<Decimal>,

    /// Down payment as a percent of the price (default from config)
    #[arg(long)]
    pub down_payment_percent: Option<Decimal>,

    /// Annual interest rate (e.g. 6.5 for 6.5%)
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Loan term in years (default from config)
    #[arg(long)]
    pub loan_term: Option<u32>,

    /// Annual property tax
    #[arg(long)]
    pub property_tax: Option<Decimal>,

    /// Annual homeowners insurance
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Monthly HOA dues
    #[arg(long)]
    pub hoa_fee: Option<Decimal>,

    /// Annual PMI premium as a percent of the loan
    #[arg(long)]
    pub pmi_rate: Option<Decimal>,

    /// Loan start date (YYYY-MM-DD) for the payoff date
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_mortgage(
    args: MortgageArgs,
    defaults: &CalculatorDefaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mortgage_input: MortgageInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        MortgageInput {
            home_price: args
                .home_price
                .ok_or("--home-price is required (or provide --input)")?,
            down_payment_percent: args
                .down_payment_percent
                .unwrap_or(defaults.down_payment_percent),
            interest_rate: args
                .interest_rate
                .ok_or("--interest-rate is required (or provide --input)")?,
            loan_term_years: args.loan_term.unwrap_or(defaults.loan_term_years),
            property_tax: args.property_tax.unwrap_or_default(),
            insurance: args.insurance.unwrap_or_default(),
            hoa_fee: args.hoa_fee.unwrap_or_default(),
            pmi_rate: args.pmi_rate.unwrap_or_default(),
            start_date: args.start_date,
        }
    };

    let result = mortgage::calculate_mortgage(&mortgage_input)?;
    Ok(serde_json::to_value(result)?)
}
