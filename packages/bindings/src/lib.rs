use napi::Result as NapiResult;
use napi_derive::napi;

use propcalc_core::config::CalculatorDefaults;
use propcalc_core::guard::RawCalculatorInput;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse optional defaults JSON; absent or empty means built-in defaults.
fn parse_defaults(defaults_json: Option<String>) -> NapiResult<CalculatorDefaults> {
    match defaults_json.as_deref().map(str::trim) {
        None | Some("") => Ok(CalculatorDefaults::default()),
        Some(json) => {
            let defaults: CalculatorDefaults = serde_json::from_str(json).map_err(to_napi_error)?;
            defaults.validate().map_err(to_napi_error)?;
            Ok(defaults)
        }
    }
}

// ---------------------------------------------------------------------------
// ROI calculator
// ---------------------------------------------------------------------------

#[napi]
pub fn project_investment(input_json: String, defaults_json: Option<String>) -> NapiResult<String> {
    let input: RawCalculatorInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let defaults = parse_defaults(defaults_json)?;
    let output = propcalc_core::projection::analyze_investment(&input, &defaults)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_timeline(input_json: String, defaults_json: Option<String>) -> NapiResult<String> {
    let input: RawCalculatorInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let defaults = parse_defaults(defaults_json)?;
    let timeline =
        propcalc_core::projection::analyze_timeline(&input, &defaults).map_err(to_napi_error)?;
    serde_json::to_string(&timeline).map_err(to_napi_error)
}

#[napi]
pub fn validate_calculator_inputs(input_json: String) -> NapiResult<String> {
    let input: RawCalculatorInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let result = propcalc_core::guard::validate_inputs(&input);
    serde_json::to_string(&result).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Mortgage
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_mortgage(input_json: String) -> NapiResult<String> {
    let input: propcalc_core::mortgage::MortgageInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = propcalc_core::mortgage::calculate_mortgage(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: propcalc_core::amortization::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        propcalc_core::amortization::generate_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Cash flow
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_cash_flow(input_json: String) -> NapiResult<String> {
    let input: propcalc_core::cash_flow::CashFlowInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = propcalc_core::cash_flow::analyze_cash_flow(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

#[napi]
pub fn format_currency(amount: f64) -> String {
    propcalc_core::format::format_currency_f64(amount)
}

#[napi]
pub fn format_percentage(value: f64) -> String {
    propcalc_core::format::format_percentage_f64(value)
}
