//! Repository abstractions for data access.
//!
//! Each repository owns one aggregate. Every mutating operation runs
//! inside a single database transaction: the unit of work either lands
//! completely or not at all. All queries are scoped by `dealer_id`.

pub mod buyer;
pub mod counter;
pub mod crop;
pub mod crop_payment;
pub mod farmer;
pub mod inventory;
pub mod loan;
pub mod loan_payment;
pub mod loan_summary;
pub mod settlement;

pub use buyer::BuyerRepository;
pub use counter::CounterRepository;
pub use crop::CropRepository;
pub use crop_payment::CropPaymentRepository;
pub use farmer::FarmerRepository;
pub use inventory::InventoryRepository;
pub use loan::LoanRepository;
pub use loan_payment::LoanPaymentRepository;
pub use loan_summary::LoanSummaryRepository;
pub use settlement::SettlementRepository;

use mandi_shared::AppError;
use sea_orm::DbErr;

/// Maps a database error onto the application error surface.
pub(crate) fn db_err(err: DbErr) -> AppError {
    AppError::Database(err.to_string())
}

/// Current timestamp in the column type used across all tables.
pub(crate) fn now() -> sea_orm::prelude::DateTimeWithTimeZone {
    chrono::Utc::now().into()
}
