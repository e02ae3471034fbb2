use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::DEFAULT_TERM_YEARS;
use crate::error::PropCalcError;
use crate::guard::MAX_YEARS;
use crate::types::Percent;
use crate::PropCalcResult;

/// Assumptions applied to calculator fields the user left blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorDefaults {
    pub loan_term_years: u32,
    pub down_payment_percent: Percent,
    pub vacancy_rate: Percent,
    /// Percent of rent unless `is_flat_fee`
    pub management_fee: Percent,
    pub is_flat_fee: bool,
    pub annual_appreciation: Percent,
    pub holding_period_years: u32,
}

impl Default for CalculatorDefaults {
    fn default() -> Self {
        Self {
            loan_term_years: DEFAULT_TERM_YEARS,
            down_payment_percent: dec!(20),
            vacancy_rate: dec!(5),
            management_fee: dec!(8),
            is_flat_fee: false,
            annual_appreciation: dec!(3),
            holding_period_years: 5,
        }
    }
}

impl CalculatorDefaults {
    /// Reject defaults that would bypass the input guard.
    pub fn validate(&self) -> PropCalcResult<()> {
        check_years("loan_term_years", self.loan_term_years)?;
        check_years("holding_period_years", self.holding_period_years)?;
        check_percent("down_payment_percent", self.down_payment_percent)?;
        check_percent("vacancy_rate", self.vacancy_rate)?;
        check_percent("annual_appreciation", self.annual_appreciation)?;
        if !self.is_flat_fee {
            check_percent("management_fee", self.management_fee)?;
        } else if self.management_fee < Decimal::ZERO {
            return Err(PropCalcError::Config(
                "management_fee cannot be negative".into(),
            ));
        }
        Ok(())
    }
}

fn check_years(field: &str, value: u32) -> PropCalcResult<()> {
    if value == 0 || value > MAX_YEARS {
        return Err(PropCalcError::Config(format!(
            "{field} must be between 1 and {MAX_YEARS}, got {value}"
        )));
    }
    Ok(())
}

fn check_percent(field: &str, value: Percent) -> PropCalcResult<()> {
    if value < Decimal::ZERO || value > dec!(100) {
        return Err(PropCalcError::Config(format!(
            "{field} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}
