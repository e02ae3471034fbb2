use clap::Args;
use serde_json::Value;

use propcalc_core::config::CalculatorDefaults;
use propcalc_core::guard::RawCalculatorInput;
use propcalc_core::projection;

use crate::input;

/// Calculator form fields shared by `roi` and `validate`. Percentages are
/// entered as on the form (4.5 = 4.5%).
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CalculatorFormArgs {
    /// Purchase price
    #[arg(long)]
    pub property_value: Option<f64>,

    /// Down payment in currency (takes precedence over --down-payment-percent)
    #[arg(long)]
    pub down_payment: Option<f64>,

    /// Down payment as a percent of the purchase price
    #[arg(long)]
    pub down_payment_percent: Option<f64>,

    #[arg(long)]
    pub closing_costs: Option<f64>,

    #[arg(long)]
    pub renovation_costs: Option<f64>,

    #[arg(long)]
    pub monthly_rent: Option<f64>,

    /// Monthly principal and interest (derived from the loan when omitted)
    #[arg(long)]
    pub mortgage_payment: Option<f64>,

    /// Annual property tax
    #[arg(long)]
    pub property_tax: Option<f64>,

    /// Annual insurance premium
    #[arg(long)]
    pub insurance: Option<f64>,

    /// Monthly maintenance
    #[arg(long)]
    pub maintenance: Option<f64>,

    #[arg(long)]
    pub vacancy_rate: Option<f64>,

    /// Percent of rent, or a monthly amount with --flat-fee
    #[arg(long)]
    pub management_fee: Option<f64>,

    /// Treat --management-fee as a flat monthly amount
    #[arg(long)]
    pub flat_fee: bool,

    /// Other monthly expenses
    #[arg(long)]
    pub other_expenses: Option<f64>,

    /// Annual interest rate
    #[arg(long)]
    pub interest_rate: Option<f64>,

    #[arg(long)]
    pub appreciation: Option<f64>,

    /// Holding period in years
    #[arg(long)]
    pub holding_period: Option<f64>,

    /// Loan term in years
    #[arg(long)]
    pub loan_term: Option<f64>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

impl CalculatorFormArgs {
    /// Form state from the input file, piped JSON, or the flags, in that order.
    pub fn read_form(&self) -> Result<RawCalculatorInput, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            return input::file::read_json(path);
        }
        if let Some(data) = input::stdin::read_stdin()? {
            return Ok(data);
        }
        Ok(RawCalculatorInput {
            property_value: self.property_value,
            down_payment_amount: self.down_payment,
            down_payment_percent: self.down_payment_percent,
            closing_costs: self.closing_costs,
            renovation_costs: self.renovation_costs,
            monthly_rent: self.monthly_rent,
            mortgage_payment: self.mortgage_payment,
            property_tax: self.property_tax,
            insurance: self.insurance,
            maintenance_cost: self.maintenance,
            vacancy_rate: self.vacancy_rate,
            management_fee: self.management_fee,
            is_flat_fee: self.flat_fee.then_some(true),
            other_expenses: self.other_expenses,
            interest_rate: self.interest_rate,
            annual_appreciation: self.appreciation,
            holding_period: self.holding_period,
            loan_term: self.loan_term,
        })
    }
}

/// Arguments for the buy-and-hold projection
#[derive(Args)]
pub struct RoiArgs {
    #[command(flatten)]
    pub form: CalculatorFormArgs,

    /// Print the year-by-year timeline instead of the summary
    #[arg(long)]
    pub timeline: bool,
}

pub fn run_roi(
    args: RoiArgs,
    defaults: &CalculatorDefaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = args.form.read_form()?;
    if args.timeline {
        let timeline = projection::analyze_timeline(&raw, defaults)?;
        return Ok(serde_json::to_value(timeline)?);
    }

    let output = projection::analyze_investment(&raw, defaults)?;
    Ok(serde_json::to_value(output)?)
}
