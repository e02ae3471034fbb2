use clap::Args;
use serde_json::Value;

use propcalc_core::guard;

use super::roi::CalculatorFormArgs;

/// Arguments for input validation
#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub form: CalculatorFormArgs,
}

/// Report every violated rule. An invalid form is still a successful run.
pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = args.form.read_form()?;
    let result = guard::validate_inputs(&raw);
    Ok(serde_json::to_value(result)?)
}
