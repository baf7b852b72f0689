//! `SeaORM` Entity for the farmers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "farmers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dealer_id: Uuid,
    /// Dealer-scoped business ID (`FM-1`, `FM-2`, ...).
    pub farmer_id: String,
    pub name: String,
    pub mobile: String,
    pub year: i32,
    pub address: String,
    pub village: String,
    pub city: String,
    pub state: String,
    pub zip: String,
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
