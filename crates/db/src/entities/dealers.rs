//! `SeaORM` Entity for the dealers table.
//!
//! The dealer is the tenancy root: every other table carries a
//! `dealer_id` and every query filters on it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "dealers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub mobile: String,
    pub market_name: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::farmers::Entity")]
    Farmers,
    #[sea_orm(has_many = "super::buyers::Entity")]
    Buyers,
}

impl Related<super::farmers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farmers.def()
    }
}

impl Related<super::buyers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Buyers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
