//! `SeaORM` Entity for the loan_payments table.
//!
//! Same immutable-record-plus-reversal shape as crop payments; the
//! allocation lines additionally carry the interest accrued per loan.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{PaymentMode, PaymentStatus};
use super::snapshots::LoanAllocations;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "loan_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dealer_id: Uuid,
    /// Business ID of the payment (`PAY-FM-1-LN-1`); a reversal row
    /// carries its original's ID here.
    pub payment_id: String,
    pub farmer_ref_id: Uuid,
    pub farmer_name: String,
    pub farmer_business_id: String,
    pub mode: PaymentMode,
    /// FIFO allocation lines with per-line summary snapshots.
    pub payments: LoanAllocations,
    /// Sum of total payable (principal plus interest) across targets.
    pub total_loan_amount: Decimal,
    pub amount_received: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub status: PaymentStatus,
    pub is_reversal: bool,
    /// Business ID minted for the reversal row (`REV-FM-1-LN-1`).
    pub reversed_payment_id: Option<String>,
    pub date: DateTimeWithTimeZone,
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
