//! `SeaORM` entity definitions.

pub mod buyers;
pub mod counters;
pub mod crop_payments;
pub mod crops;
pub mod dealers;
pub mod farmers;
pub mod inventories;
pub mod loan_payments;
pub mod loan_summaries;
pub mod loans;
pub mod sea_orm_active_enums;
pub mod settlements;
pub mod snapshots;
