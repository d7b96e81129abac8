//! Closed-form finance helpers shared by the entity projector
//!
//! - `loan`: per-period interest/principal split for each repayment policy
//! - `pension`: accumulation FV, distribution PMT and benefit estimates

pub mod loan;
pub mod pension;

pub use loan::{amortization_schedule, amortize, AmortizationError, LoanPeriod, PaymentSplit};
pub use pension::{AccumulationInput, PensionCalculator, PensionEstimate};
