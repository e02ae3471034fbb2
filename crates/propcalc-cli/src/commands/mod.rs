pub mod amortization;
pub mod cash_flow;
pub mod mortgage;
pub mod roi;
pub mod validate;
