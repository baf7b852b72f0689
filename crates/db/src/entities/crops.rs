//! `SeaORM` Entity for the crops table.
//!
//! A crop row is one purchase (from a farmer) or sale (to a buyer).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{CropGrade, PartyKind, PaymentStatus};
use super::snapshots::InventoryTrail;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "crops")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dealer_id: Uuid,
    /// Dealer-scoped business ID (`CR-FM-1-MUSTARD-1`).
    pub crop_id: String,
    pub person_type: PartyKind,
    pub person_ref_id: Uuid,
    pub person_business_id: String,
    pub person_name: String,
    pub crop_type: String,
    pub grade: CropGrade,
    pub quantity: Decimal,
    pub no_of_gunny: Decimal,
    pub gunny_quantity: Decimal,
    pub price_per_quintal: Decimal,
    pub labour_charges: Decimal,
    pub transport_charges: Decimal,
    pub other_charges: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub date: DateTimeWithTimeZone,
    /// Inventory snapshots appended on every save touching this crop.
    pub inventory: InventoryTrail,
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
