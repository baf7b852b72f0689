//! `SeaORM` Entity for the loan_summaries table.
//!
//! One row per dealer, created lazily on the first loan.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "loan_summaries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub dealer_id: Uuid,
    pub total_loan_given: Decimal,
    pub total_interest_accrued: Decimal,
    pub total_payable_amount: Decimal,
    pub total_paid_amount: Decimal,
    pub total_pending_amount: Decimal,
    pub average_interest_rate: Decimal,
    pub total_loans: i32,
    pub ongoing_loans: i32,
    pub finished_loans: i32,
    pub last_updated_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dealers::Entity",
        from = "Column::DealerId",
        to = "super::dealers::Column::Id"
    )]
    Dealers,
}

impl Related<super::dealers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dealers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Reconstructs the in-memory summary ledger from a stored row.
    #[must_use]
    pub fn to_ledger(&self) -> mandi_core::loan::SummaryLedger {
        mandi_core::loan::SummaryLedger {
            total_loan_given: self.total_loan_given,
            total_interest_accrued: self.total_interest_accrued,
            total_payable_amount: self.total_payable_amount,
            total_paid_amount: self.total_paid_amount,
            total_pending_amount: self.total_pending_amount,
            average_interest_rate: self.average_interest_rate,
            total_loans: self.total_loans.unsigned_abs(),
            ongoing_loans: self.ongoing_loans.unsigned_abs(),
            finished_loans: self.finished_loans.unsigned_abs(),
        }
    }
}
