//! Loan arithmetic: day-based simple interest accrual and the running
//! per-dealer loan summary.

mod interest;
mod summary;

pub use interest::{accrual_days, accrue, simple_interest, Accrual};
pub use summary::{SummaryLedger, SummarySnapshot};
