//! Farmer repository.

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
use crate::entities::{crops, farmers, loans};

/// Input for registering a farmer.
#[derive(Debug, Clone)]
pub struct CreateFarmerInput {
    /// Farmer's name.
    pub name: String,
    /// Contact number.
    pub mobile: String,
    /// Year of registration.
    pub year: i32,
    /// Street address.
    pub address: String,
    /// Village.
    pub village: String,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Postal code.
    pub zip: String,
}

/// Farmer repository for registration and lookup.
#[derive(Debug, Clone)]
pub struct FarmerRepository {
    db: DatabaseConnection,
}

impl FarmerRepository {
    /// Creates a new farmer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a farmer, minting the next `FM-{n}` ID for the dealer.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub async fn create_farmer(
        &self,
        dealer_id: DealerId,
        input: CreateFarmerInput,
    ) -> AppResult<farmers::Model> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let seq = CounterRepository::next_sequence(&txn, &Scope::Farmer(dealer_id).key())
            .await
            .map_err(db_err)?;

        let ts = now();
        let farmer = farmers::ActiveModel {
            id: Set(Uuid::now_v7()),
            dealer_id: Set(dealer_id.into_inner()),
            farmer_id: Set(business_id::farmer_id(seq)),
            name: Set(input.name),
            mobile: Set(input.mobile),
            year: Set(input.year),
            address: Set(input.address),
            village: Set(input.village),
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
        tracing::info!(farmer_id = %farmer.farmer_id, "farmer registered");
        Ok(farmer)
    }

    /// Lists the dealer's farmers, newest first, optionally filtered by
    /// a case-insensitive name or business-ID search.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_farmers(
        &self,
        dealer_id: DealerId,
        search: Option<&str>,
    ) -> AppResult<Vec<farmers::Model>> {
        let mut query = farmers::Entity::find()
            .filter(farmers::Column::DealerId.eq(dealer_id.into_inner()))
            .order_by_desc(farmers::Column::CreatedAt);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            query = query.filter(
                Condition::any()
                    .add(Expr::col((farmers::Entity, farmers::Column::Name)).ilike(pattern.clone()))
                    .add(Expr::col((farmers::Entity, farmers::Column::FarmerId)).ilike(pattern)),
            );
        }

        query.all(&self.db).await.map_err(db_err)
    }

    /// Finds a farmer by business ID within the dealer's tenancy.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent or owned by another dealer.
    pub async fn find_by_business_id(
        &self,
        dealer_id: DealerId,
        farmer_business_id: &str,
    ) -> AppResult<farmers::Model> {
        find(&self.db, dealer_id, farmer_business_id).await
    }

    /// Deletes a farmer. Blocked while any crop or loan still references
    /// them; ledger history outlives the party it names.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if ledger records exist for the farmer.
    pub async fn delete_farmer(
        &self,
        dealer_id: DealerId,
        farmer_business_id: &str,
    ) -> AppResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let farmer = find(&txn, dealer_id, farmer_business_id).await?;

        let crop_count = crops::Entity::find()
            .filter(crops::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(crops::Column::PersonBusinessId.eq(farmer_business_id))
            .count(&txn)
            .await
            .map_err(db_err)?;

        let loan_count = loans::Entity::find()
            .filter(loans::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(loans::Column::FarmerBusinessId.eq(farmer_business_id))
            .count(&txn)
            .await
            .map_err(db_err)?;

        if crop_count > 0 || loan_count > 0 {
            return Err(AppError::Conflict(format!(
                "Farmer {farmer_business_id} has {crop_count} crop and {loan_count} loan records"
            )));
        }

        farmer.delete(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }
}

/// Farmer lookup on the caller's connection or transaction.
pub(crate) async fn find<C: ConnectionTrait>(
    conn: &C,
    dealer_id: DealerId,
    farmer_business_id: &str,
) -> AppResult<farmers::Model> {
    farmers::Entity::find()
        .filter(farmers::Column::DealerId.eq(dealer_id.into_inner()))
        .filter(farmers::Column::FarmerId.eq(farmer_business_id))
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::NotFound(format!("Farmer {farmer_business_id}")))
}
