//! Buyer repository.

use mandi_shared::types::{business_id, DealerId, Scope};
use mandi_shared::{AppError, AppResult};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{db_err, now, CounterRepository};
use crate::entities::{buyers, crops};

/// Input for registering a buyer.
#[derive(Debug, Clone)]
pub struct CreateBuyerInput {
    /// Buyer's name.
    pub name: String,
    /// Contact number.
    pub mobile: String,
    /// Year of registration.
    pub year: i32,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Postal code.
    pub zip: String,
}

/// Buyer repository for registration and lookup.
#[derive(Debug, Clone)]
pub struct BuyerRepository {
    db: DatabaseConnection,
}

impl BuyerRepository {
    /// Creates a new buyer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a buyer, minting the next `BR-{n}` ID for the dealer.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub async fn create_buyer(
        &self,
        dealer_id: DealerId,
        input: CreateBuyerInput,
    ) -> AppResult<buyers::Model> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let seq = CounterRepository::next_sequence(&txn, &Scope::Buyer(dealer_id).key())
            .await
            .map_err(db_err)?;

        let ts = now();
        let buyer = buyers::ActiveModel {
            id: Set(Uuid::now_v7()),
            dealer_id: Set(dealer_id.into_inner()),
            buyer_id: Set(business_id::buyer_id(seq)),
            name: Set(input.name),
            mobile: Set(input.mobile),
            year: Set(input.year),
            address: Set(input.address),
            city: Set(input.city),
            state: Set(input.state),
            zip: Set(input.zip),
            created_at: Set(ts),
            updated_at: Set(ts),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        tracing::info!(buyer_id = %buyer.buyer_id, "buyer registered");
        Ok(buyer)
    }

    /// Lists the dealer's buyers, newest first, optionally filtered by
    /// a case-insensitive name or business-ID search.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_buyers(
        &self,
        dealer_id: DealerId,
        search: Option<&str>,
    ) -> AppResult<Vec<buyers::Model>> {
        let mut query = buyers::Entity::find()
            .filter(buyers::Column::DealerId.eq(dealer_id.into_inner()))
            .order_by_desc(buyers::Column::CreatedAt);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            query = query.filter(
                Condition::any()
                    .add(Expr::col((buyers::Entity, buyers::Column::Name)).ilike(pattern.clone()))
                    .add(Expr::col((buyers::Entity, buyers::Column::BuyerId)).ilike(pattern)),
            );
        }

        query.all(&self.db).await.map_err(db_err)
    }

    /// Finds a buyer by business ID within the dealer's tenancy.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent or owned by another dealer.
    pub async fn find_by_business_id(
        &self,
        dealer_id: DealerId,
        buyer_business_id: &str,
    ) -> AppResult<buyers::Model> {
        find(&self.db, dealer_id, buyer_business_id).await
    }

    /// Deletes a buyer. Blocked while any crop still references them.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if crop records exist for the buyer.
    pub async fn delete_buyer(
        &self,
        dealer_id: DealerId,
        buyer_business_id: &str,
    ) -> AppResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let buyer = find(&txn, dealer_id, buyer_business_id).await?;

        let crop_count = crops::Entity::find()
            .filter(crops::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(crops::Column::PersonBusinessId.eq(buyer_business_id))
            .count(&txn)
            .await
            .map_err(db_err)?;

        if crop_count > 0 {
            return Err(AppError::Conflict(format!(
                "Buyer {buyer_business_id} has {crop_count} crop records"
            )));
        }

        buyer.delete(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }
}

/// Buyer lookup on the caller's connection or transaction.
pub(crate) async fn find<C: ConnectionTrait>(
    conn: &C,
    dealer_id: DealerId,
    buyer_business_id: &str,
) -> AppResult<buyers::Model> {
    buyers::Entity::find()
        .filter(buyers::Column::DealerId.eq(dealer_id.into_inner()))
        .filter(buyers::Column::BuyerId.eq(buyer_business_id))
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::NotFound(format!("Buyer {buyer_business_id}")))
}
