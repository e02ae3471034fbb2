//! Property investment calculations: mortgage amortisation, buy-and-hold ROI
//! projection and rental cash flow, with decimal precision.
//!
//! Raw `f64` form values pass through [`guard`] once; everything past it is
//! `rust_decimal::Decimal`. All calculations are pure functions.

pub mod amortization;
pub mod config;
pub mod error;
pub mod format;
pub mod guard;
pub mod primitives;
pub mod projection;
pub mod types;

#[cfg(feature = "mortgage")]
pub mod mortgage;

#[cfg(feature = "cash_flow")]
pub mod cash_flow;

pub use error::PropCalcError;
pub use types::*;

/// Standard result type for all propcalc operations
pub type PropCalcResult<T> = Result<T, PropCalcError>;
