//! `SeaORM` Entity for the inventories table.
//!
//! One row per (dealer, crop type), holding the running stock ledger.
//! Rows are created on the first purchase of a crop type and deleted
//! when the ledger returns to its zero state.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "inventories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dealer_id: Uuid,
    /// Derived business ID (`CR-MUSTARD`).
    pub inventory_id: String,
    pub crop_name: String,
    pub gunny_quantity: Decimal,
    pub buy_gunny: Decimal,
    pub sell_gunny: Decimal,
    pub in_stock_gunny: Decimal,
    pub labour_charges: Decimal,
    pub transport_charges: Decimal,
    pub other_charges: Decimal,
    pub total_in_stock: Decimal,
    pub total_buy_quantity: Decimal,
    pub total_sell_quantity: Decimal,
    pub average_buy_price: Decimal,
    pub average_sell_price: Decimal,
    pub total_payment_buy: Decimal,
    pub total_payment_sell: Decimal,
    pub payment_receive_paid: Decimal,
    pub payment_receive_pending: Decimal,
    pub payment_give_paid: Decimal,
    pub payment_give_pending: Decimal,
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
    /// Reconstructs the in-memory ledger from a stored row.
    #[must_use]
    pub fn to_ledger(&self) -> mandi_core::inventory::StockLedger {
        mandi_core::inventory::StockLedger {
            gunny_capacity: self.gunny_quantity,
            buy_gunny: self.buy_gunny,
            sell_gunny: self.sell_gunny,
            in_stock_gunny: self.in_stock_gunny,
            labour_charges: self.labour_charges,
            transport_charges: self.transport_charges,
            other_charges: self.other_charges,
            total_in_stock: self.total_in_stock,
            total_buy_quantity: self.total_buy_quantity,
            total_sell_quantity: self.total_sell_quantity,
            average_buy_price: self.average_buy_price,
            average_sell_price: self.average_sell_price,
            total_payment_buy: self.total_payment_buy,
            total_payment_sell: self.total_payment_sell,
            payment_receive_paid: self.payment_receive_paid,
            payment_receive_pending: self.payment_receive_pending,
            payment_give_paid: self.payment_give_paid,
            payment_give_pending: self.payment_give_pending,
        }
    }
}
