//! `SeaORM` Entity for the counters table.
//!
//! Backs the business-ID sequences. The primary key is the composite
//! scope string (e.g. `PAY-{dealer}-FM-1`); `seq` only ever moves
//! forward, via an atomic upsert.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "counters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub seq: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
