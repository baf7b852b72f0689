//! Inventory repository: stock views plus the row mechanics shared by
//! every operation that moves stock.

use mandi_core::inventory::StockLedger;
use mandi_shared::types::business_id;
use mandi_shared::types::DealerId;
use mandi_shared::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::{db_err, now};
use crate::entities::inventories;

/// Read access to the per-crop stock ledgers.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    db: DatabaseConnection,
}

impl InventoryRepository {
    /// Creates a new inventory repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists every stock row for the dealer, ordered by crop name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self, dealer_id: DealerId) -> AppResult<Vec<inventories::Model>> {
        inventories::Entity::find()
            .filter(inventories::Column::DealerId.eq(dealer_id.into_inner()))
            .order_by_asc(inventories::Column::CropName)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists only the rows still holding stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_in_stock(&self, dealer_id: DealerId) -> AppResult<Vec<inventories::Model>> {
        inventories::Entity::find()
            .filter(inventories::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(inventories::Column::TotalInStock.gt(rust_decimal::Decimal::ZERO))
            .order_by_asc(inventories::Column::CropName)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Finds the stock row for one crop type.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the dealer holds no stock of this crop.
    pub async fn find_by_crop(
        &self,
        dealer_id: DealerId,
        crop_name: &str,
    ) -> AppResult<inventories::Model> {
        fetch(&self.db, dealer_id, crop_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Inventory for {crop_name}")))
    }
}

/// Loads the stock row for (dealer, crop type) on the caller's
/// connection or transaction.
pub(crate) async fn fetch<C: ConnectionTrait>(
    conn: &C,
    dealer_id: DealerId,
    crop_name: &str,
) -> AppResult<Option<inventories::Model>> {
    inventories::Entity::find()
        .filter(inventories::Column::DealerId.eq(dealer_id.into_inner()))
        .filter(inventories::Column::CropName.eq(crop_name))
        .one(conn)
        .await
        .map_err(db_err)
}

/// Writes a ledger back to its row: inserts on first use, updates in
/// place, and deletes the row once the ledger is empty. Returns the row
/// ID, or `None` when the row was removed.
pub(crate) async fn persist<C: ConnectionTrait>(
    conn: &C,
    existing: Option<inventories::Model>,
    ledger: &StockLedger,
    dealer_id: DealerId,
    crop_name: &str,
) -> AppResult<Option<Uuid>> {
    let ts = now();

    match existing {
        Some(model) if ledger.is_empty() => {
            model.delete(conn).await.map_err(db_err)?;
            Ok(None)
        }
        Some(model) => {
            let id = model.id;
            let mut active: inventories::ActiveModel = model.into();
            apply_fields(&mut active, ledger);
            active.last_updated_at = Set(ts);
            active.updated_at = Set(ts);
            active.update(conn).await.map_err(db_err)?;
            Ok(Some(id))
        }
        None if ledger.is_empty() => Ok(None),
        None => {
            let id = Uuid::now_v7();
            let mut active = inventories::ActiveModel {
                id: Set(id),
                dealer_id: Set(dealer_id.into_inner()),
                inventory_id: Set(business_id::inventory_id(crop_name)),
                crop_name: Set(crop_name.to_string()),
                last_updated_at: Set(ts),
                created_at: Set(ts),
                updated_at: Set(ts),
                ..Default::default()
            };
            apply_fields(&mut active, ledger);
            active.insert(conn).await.map_err(db_err)?;
            Ok(Some(id))
        }
    }
}

fn apply_fields(active: &mut inventories::ActiveModel, ledger: &StockLedger) {
    active.gunny_quantity = Set(ledger.gunny_capacity);
    active.buy_gunny = Set(ledger.buy_gunny);
    active.sell_gunny = Set(ledger.sell_gunny);
    active.in_stock_gunny = Set(ledger.in_stock_gunny);
    active.labour_charges = Set(ledger.labour_charges);
    active.transport_charges = Set(ledger.transport_charges);
    active.other_charges = Set(ledger.other_charges);
    active.total_in_stock = Set(ledger.total_in_stock);
    active.total_buy_quantity = Set(ledger.total_buy_quantity);
    active.total_sell_quantity = Set(ledger.total_sell_quantity);
    active.average_buy_price = Set(ledger.average_buy_price);
    active.average_sell_price = Set(ledger.average_sell_price);
    active.total_payment_buy = Set(ledger.total_payment_buy);
    active.total_payment_sell = Set(ledger.total_payment_sell);
    active.payment_receive_paid = Set(ledger.payment_receive_paid);
    active.payment_receive_pending = Set(ledger.payment_receive_pending);
    active.payment_give_paid = Set(ledger.payment_give_paid);
    active.payment_give_pending = Set(ledger.payment_give_pending);
}
