//! `SeaORM` Entity for the settlements table.
//!
//! A settlement nets a farmer's crop receivables against their loan
//! debt and stores both allocation arrays. Settlements are terminal:
//! any payment referenced here can no longer be reversed on its own.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{PaymentStatus, SettlementDirection};
use super::snapshots::{CropAllocations, LoanAllocations};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "settlements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dealer_id: Uuid,
    /// Business ID of the settlement (`SETL-FM-1-1`); a reversal row
    /// carries its original's ID here.
    pub settlement_id: String,
    pub farmer_ref_id: Uuid,
    pub farmer_name: String,
    pub farmer_business_id: String,
    pub crop_payments: CropAllocations,
    pub loan_payments: LoanAllocations,
    pub total_crop_amount: Decimal,
    pub total_loan_amount: Decimal,
    /// Signed `crop pending - loan pending` at settlement time.
    pub net_amount: Decimal,
    pub settlement_direction: SettlementDirection,
    /// Extra cash that changed hands on top of the netting.
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub status: PaymentStatus,
    pub is_reversal: bool,
    /// Business ID minted for the reversal row (`REV-SETL-FM-1-1`).
    pub reversed_settlement_id: Option<String>,
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
    #[sea_orm(
        belongs_to = "super::farmers::Entity",
        from = "Column::FarmerRefId",
        to = "super::farmers::Column::Id"
    )]
    Farmers,
}

impl Related<super::dealers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dealers.def()
    }
}

impl Related<super::farmers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farmers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
