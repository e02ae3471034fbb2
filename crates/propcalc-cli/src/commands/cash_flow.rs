use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use propcalc_core::cash_flow::{self, CashFlowInput};
use propcalc_core::config::CalculatorDefaults;

use crate::input;

/// Arguments for rental cash-flow analysis
#[derive(Args)]
pub struct CashFlowArgs {
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// Down payment plus closing and renovation costs
    #[arg(long)]
    pub cash_invested: Option<Decimal>,

    #[arg(long)]
    pub monthly_rent: Option<Decimal>,

    /// Other monthly income (parking, laundry)
    #[arg(long)]
    pub other_income: Option<Decimal>,

    /// Vacancy rate percent (default from config)
    #[arg(long)]
    pub vacancy_rate: Option<Decimal>,

    /// Annual property tax
    #[arg(long)]
    pub property_tax: Option<Decimal>,

    /// Annual insurance premium
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Monthly maintenance
    #[arg(long)]
    pub maintenance: Option<Decimal>,

    /// Percent of rent, or a monthly amount with --flat-fee (default from config)
    #[arg(long)]
    pub management_fee: Option<Decimal>,

    /// Treat --management-fee as a flat monthly amount
    #[arg(long)]
    pub flat_fee: bool,

    /// Other monthly expenses
    #[arg(long)]
    pub other_expenses: Option<Decimal>,

    /// Monthly principal and interest
    #[arg(long)]
    pub mortgage_payment: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_cash_flow(
    args: CashFlowArgs,
    defaults: &CalculatorDefaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let cf_input: CashFlowInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let is_flat_fee = args.flat_fee || defaults.is_flat_fee;
        CashFlowInput {
            purchase_price: args
                .purchase_price
                .ok_or("--purchase-price is required (or provide --input)")?,
            cash_invested: args
                .cash_invested
                .ok_or("--cash-invested is required (or provide --input)")?,
            monthly_rent: args
                .monthly_rent
                .ok_or("--monthly-rent is required (or provide --input)")?,
            other_income: args.other_income.unwrap_or_default(),
            vacancy_rate: args.vacancy_rate.unwrap_or(defaults.vacancy_rate),
            property_tax: args.property_tax.unwrap_or_default(),
            insurance: args.insurance.unwrap_or_default(),
            maintenance: args.maintenance.unwrap_or_default(),
            management_fee: match args.management_fee {
                Some(fee) => fee,
                None if is_flat_fee == defaults.is_flat_fee => defaults.management_fee,
                None => Decimal::ZERO,
            },
            is_flat_fee,
            other_expenses: args.other_expenses.unwrap_or_default(),
            mortgage_payment: args.mortgage_payment.unwrap_or_default(),
        }
    };

    let result = cash_flow::analyze_cash_flow(&cf_input)?;
    Ok(serde_json::to_value(result)?)
}
