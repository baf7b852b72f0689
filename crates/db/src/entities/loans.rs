//! `SeaORM` Entity for the loans table.
//!
//! `updated_at` doubles as the interest anchor: accrual at payment time
//! counts days from the last save of the row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LoanStatus;
use super::snapshots::SummaryTrail;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "loans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dealer_id: Uuid,
    /// Dealer-scoped business ID (`LN-FM-1-1`).
    pub loan_id: String,
    pub farmer_ref_id: Uuid,
    pub farmer_business_id: String,
    pub person_name: String,
    /// Original principal.
    pub loan_amount: Decimal,
    /// Annual interest rate in percent.
    pub interest_rate: Decimal,
    /// Days covered by the most recent accrual.
    pub period_in_days: i64,
    /// Interest accrued over the loan's lifetime.
    pub interest_amount: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub remark: String,
    pub status: LoanStatus,
    /// Loan-summary snapshots appended on every save touching this loan.
    pub summary: SummaryTrail,
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
