use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::types::{Money, Percent, Rate};

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

/// Convert an annual percentage (4.5) into a monthly decimal rate (0.00375).
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / dec!(100) / dec!(12)
}

// ---------------------------------------------------------------------------
// Mortgage payment
// ---------------------------------------------------------------------------

/// Standard fixed-rate mortgage payment: P * r / (1 - (1+r)^-n)
///
/// Algebraically the same as `P * r(1+r)^n / ((1+r)^n - 1)` but never forms
/// `P * (1+r)^n`, which overflows Decimal for long high-rate loans. Returns
/// zero for a non-positive principal or a zero term; a zero rate amortises
/// straight-line.
pub fn monthly_mortgage_payment(principal: Money, annual_rate_percent: Percent, years: u32) -> Money {
    if principal <= Decimal::ZERO || years == 0 {
        return Decimal::ZERO;
    }

    let r = monthly_rate(annual_rate_percent);
    let total_months = years * 12;

    if r.is_zero() {
        return principal / Decimal::from(total_months);
    }

    let discount = match (Decimal::ONE + r).checked_powu(u64::from(total_months)) {
        Some(compound) if !compound.is_zero() => Decimal::ONE / compound,
        // (1+r)^n beyond Decimal range: the discount term vanishes
        _ => {
            debug!(%annual_rate_percent, years, "compound factor overflowed");
            Decimal::ZERO
        }
    };

    let denominator = Decimal::ONE - discount;
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    match principal.checked_mul(r).and_then(|x| x.checked_div(denominator)) {
        Some(payment) => payment,
        None => {
            debug!(%principal, %annual_rate_percent, years, "payment out of range");
            Decimal::ZERO
        }
    }
}

// ---------------------------------------------------------------------------
// Returns
// ---------------------------------------------------------------------------

/// `part / whole * 100`. Zero `whole` or an out-of-range quotient yields 0.
pub fn percent_of(part: Money, whole: Money) -> Percent {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|q| q.checked_mul(dec!(100)))
        .unwrap_or(Decimal::ZERO)
}

/// Return on investment: (gain - cost) / cost * 100. Zero cost yields 0.
///
/// `gain` is the final value, not the profit: `roi_percent(100000, 50000)`
/// is 100. For profit over cost use [`percent_of`].
pub fn roi_percent(gain: Money, cost: Money) -> Percent {
    percent_of(gain - cost, cost)
}

/// Geometric annual equivalent of a cumulative return over `years`.
///
/// Losses of 100% or more have no real root; they are floored at -100%.
pub fn annualized_return(total_return_percent: Percent, years: u32) -> Percent {
    let growth = Decimal::ONE + total_return_percent / dec!(100);
    if growth <= Decimal::ZERO {
        return dec!(-100);
    }
    if years <= 1 || total_return_percent.is_zero() {
        return total_return_percent;
    }

    let exponent = Decimal::ONE / Decimal::from(years);
    match growth.checked_powd(exponent) {
        Some(annual_growth) => (annual_growth - Decimal::ONE) * dec!(100),
        None => {
            debug!(%total_return_percent, years, "annualisation out of range");
            Decimal::ZERO
        }
    }
}

// ---------------------------------------------------------------------------
// Cash flow
// ---------------------------------------------------------------------------

/// Signed monthly cash flow: rent - expenses - mortgage.
pub fn cash_flow(rent: Money, expenses: Money, mortgage: Money) -> Money {
    rent - expenses - mortgage
}

/// Rent lost to vacancy.
pub fn vacancy_loss(rent: Money, vacancy_rate: Percent) -> Money {
    rent * vacancy_rate / dec!(100)
}

/// Management cost: the fee itself when flat, otherwise a percentage of rent.
pub fn management_cost(rent: Money, management_fee: Decimal, is_flat_fee: bool) -> Money {
    if is_flat_fee {
        management_fee
    } else {
        rent * management_fee / dec!(100)
    }
}

// ---------------------------------------------------------------------------
// Appreciation
// ---------------------------------------------------------------------------

/// value * (1 + rate/100)^years, saturating at `Decimal::MAX`.
pub fn compound_appreciation(value: Money, rate_percent: Percent, years: u32) -> Money {
    let growth = Decimal::ONE + rate_percent / dec!(100);
    growth
        .checked_powu(u64::from(years))
        .and_then(|factor| value.checked_mul(factor))
        .unwrap_or_else(|| {
            debug!(%value, %rate_percent, years, "appreciation saturated");
            Decimal::MAX
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_known_30_year() {
        let pmt = monthly_mortgage_payment(dec!(240000), dec!(4.5), 30);
        assert!(
            (pmt - dec!(1216.04)).abs() < dec!(0.01),
            "Expected ~1216.04, got {pmt}"
        );
    }

    #[test]
    fn test_payment_known_15_year() {
        let pmt = monthly_mortgage_payment(dec!(300000), dec!(3.5), 15);
        assert!(
            (pmt - dec!(2144.65)).abs() < dec!(0.01),
            "Expected ~2144.65, got {pmt}"
        );
    }

    #[test]
    fn test_payment_zero_rate_is_straight_line() {
        let pmt = monthly_mortgage_payment(dec!(360000), Decimal::ZERO, 30);
        assert_eq!(pmt, dec!(1000));
    }

    #[test]
    fn test_payment_degenerate_inputs() {
        assert_eq!(monthly_mortgage_payment(Decimal::ZERO, dec!(5), 30), Decimal::ZERO);
        assert_eq!(monthly_mortgage_payment(dec!(-1), dec!(5), 30), Decimal::ZERO);
        assert_eq!(monthly_mortgage_payment(dec!(100000), dec!(5), 0), Decimal::ZERO);
    }

    #[test]
    fn test_payment_extreme_rate_does_not_overflow() {
        let principal = dec!(1000000000000);
        let pmt = monthly_mortgage_payment(principal, dec!(100), 50);
        // Interest-only limit: P * r
        let interest_only = principal * monthly_rate(dec!(100));
        assert!(pmt >= interest_only);
        assert!(pmt - interest_only < dec!(1));
    }

    #[test]
    fn test_roi_percent() {
        assert_eq!(roi_percent(dec!(100000), dec!(50000)), dec!(100));
        assert_eq!(roi_percent(dec!(75000), dec!(50000)), dec!(50));
        assert_eq!(roi_percent(dec!(100), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(dec!(50000), dec!(100000)), dec!(50));
        assert_eq!(percent_of(dec!(100000), dec!(50000)), dec!(200));
        assert_eq!(percent_of(dec!(1), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_cash_flow_signed() {
        assert_eq!(cash_flow(dec!(2000), dec!(1500), Decimal::ZERO), dec!(500));
        assert_eq!(cash_flow(dec!(1000), dec!(1500), Decimal::ZERO), dec!(-500));
    }

    #[test]
    fn test_management_cost_modes() {
        assert_eq!(management_cost(dec!(2000), dec!(8), false), dec!(160));
        assert_eq!(management_cost(dec!(2000), dec!(150), true), dec!(150));
    }

    #[test]
    fn test_compound_appreciation() {
        let v = compound_appreciation(dec!(100000), dec!(10), 2);
        assert_eq!(v, dec!(121000));
        assert_eq!(compound_appreciation(dec!(100000), dec!(3), 0), dec!(100000));
    }

    #[test]
    fn test_annualized_return_doubles_over_two_years() {
        // 1.44 total growth over 2 years is 20% a year
        let annual = annualized_return(dec!(44), 2);
        assert!((annual - dec!(20)).abs() < dec!(0.0001), "got {annual}");
    }

    #[test]
    fn test_annualized_return_single_year_is_identity() {
        assert_eq!(annualized_return(dec!(12.5), 1), dec!(12.5));
    }

    #[test]
    fn test_annualized_return_total_loss_floor() {
        assert_eq!(annualized_return(dec!(-100), 5), dec!(-100));
        assert_eq!(annualized_return(dec!(-250), 5), dec!(-100));
    }

    #[test]
    fn test_annualized_return_partial_loss() {
        // 0.81 over 2 years is -10% a year
        let annual = annualized_return(dec!(-19), 2);
        assert!((annual - dec!(-10)).abs() < dec!(0.0001), "got {annual}");
    }
}
