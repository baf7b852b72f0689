//! `SeaORM` Entity for the crop_payments table.
//!
//! Payment records are immutable once written. A reversal is a second
//! row with `is_reversal = true` and negated allocation amounts, linked
//! to the original by `payment_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{PartyKind, PaymentMode, PaymentStatus};
use super::snapshots::CropAllocations;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "crop_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dealer_id: Uuid,
    /// Business ID of the payment (`PAY-FM-1-CR-1`); a reversal row
    /// carries its original's ID here.
    pub payment_id: String,
    pub person_type: PartyKind,
    pub person_ref_id: Uuid,
    pub person_business_id: String,
    pub person_name: String,
    pub mode: PaymentMode,
    /// FIFO allocation lines with per-line inventory snapshots.
    pub payments: CropAllocations,
    pub total_crop_amount: Decimal,
    pub amount_paid: Decimal,
    pub pending_amount: Decimal,
    pub status: PaymentStatus,
    pub is_reversal: bool,
    /// Business ID minted for the reversal row (`REV-FM-1-CR-1`).
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
