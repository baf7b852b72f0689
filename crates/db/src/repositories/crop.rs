//! Crop repository: purchases from farmers and sales to buyers, each
//! flowing through the per-crop stock ledger in one transaction.

use mandi_core::inventory::Charges;
use mandi_core::status::PaymentStatus;
use mandi_core::types::{self, Grade, PartyKind};
use mandi_shared::types::{business_id, DealerId, Scope};
use mandi_shared::{AppError, AppResult};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{buyer, db_err, farmer, inventory, now, CounterRepository};
use crate::entities::sea_orm_active_enums;
use crate::entities::snapshots::InventoryTrail;
use crate::entities::crops;

/// Input for recording a crop purchase or sale.
#[derive(Debug, Clone)]
pub struct CreateCropInput {
    /// Which side of the trade the counterparty is on.
    pub party: PartyKind,
    /// The counterparty's business ID (`FM-n` or `BR-n`).
    pub person_business_id: String,
    /// Crop type (must be one of the known types).
    pub crop_type: String,
    /// Quality grade.
    pub grade: Grade,
    /// Quantity in quintals.
    pub quantity: Decimal,
    /// Agreed price per quintal.
    pub price_per_quintal: Decimal,
    /// Bag capacity in KG. Required for farmer purchases; ignored for
    /// buyer sales, which use the capacity already fixed on the ledger.
    pub gunny_capacity: Option<Decimal>,
    /// Handling charges.
    pub charges: Charges,
}

/// Crop repository for ledgered purchases and sales.
#[derive(Debug, Clone)]
pub struct CropRepository {
    db: DatabaseConnection,
}

impl CropRepository {
    /// Creates a new crop repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a crop transaction: updates the stock ledger, mints the
    /// crop's business ID, and inserts the crop row, atomically.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad input, `NotFound` for an unknown
    /// party, `ConfigurationMismatch` for a conflicting gunny capacity,
    /// and `InsufficientStock` for an over-sell.
    pub async fn create_crop(
        &self,
        dealer_id: DealerId,
        input: CreateCropInput,
    ) -> AppResult<crops::Model> {
        if input.quantity <= Decimal::ZERO || input.price_per_quintal <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Quantity and price must be positive".into(),
            ));
        }
        if !types::is_valid_crop_type(&input.crop_type) {
            return Err(AppError::Validation(format!(
                "Unknown crop type: {}",
                input.crop_type
            )));
        }

        let txn = self.db.begin().await.map_err(db_err)?;

        let (person_ref_id, person_name) = match input.party {
            PartyKind::Farmer => {
                let f = farmer::find(&txn, dealer_id, &input.person_business_id).await?;
                (f.id, f.name)
            }
            PartyKind::Buyer => {
                let b = buyer::find(&txn, dealer_id, &input.person_business_id).await?;
                (b.id, b.name)
            }
        };

        let existing = inventory::fetch(&txn, dealer_id, &input.crop_type).await?;
        let mut ledger = existing.as_ref().map(|m| m.to_ledger()).unwrap_or_default();

        let bags = match input.party {
            PartyKind::Farmer => {
                let capacity = input.gunny_capacity.ok_or_else(|| {
                    AppError::Validation("Gunny capacity is required for a purchase".into())
                })?;
                ledger.apply_buy(
                    input.quantity,
                    input.price_per_quintal,
                    capacity,
                    input.charges,
                    Decimal::ZERO,
                )?
            }
            PartyKind::Buyer => ledger.apply_sell(
                input.quantity,
                input.price_per_quintal,
                input.charges,
                Decimal::ZERO,
            )?,
        };

        inventory::persist(&txn, existing, &ledger, dealer_id, &input.crop_type).await?;

        let seq = CounterRepository::next_sequence(
            &txn,
            &Scope::Crop {
                dealer: dealer_id,
                party_kind: input.party.as_str(),
                party: &input.person_business_id,
                crop_type: &input.crop_type,
            }
            .key(),
        )
        .await
        .map_err(db_err)?;

        let total_amount = input.quantity * input.price_per_quintal;
        let status = PaymentStatus::derive(Decimal::ZERO, total_amount);
        let ts = now();

        let crop = crops::ActiveModel {
            id: Set(Uuid::now_v7()),
            dealer_id: Set(dealer_id.into_inner()),
            crop_id: Set(business_id::crop_id(
                &input.person_business_id,
                &input.crop_type,
                seq,
            )),
            person_type: Set(input.party.into()),
            person_ref_id: Set(person_ref_id),
            person_business_id: Set(input.person_business_id),
            person_name: Set(person_name),
            crop_type: Set(input.crop_type),
            grade: Set(input.grade.into()),
            quantity: Set(input.quantity),
            no_of_gunny: Set(bags),
            gunny_quantity: Set(ledger.gunny_capacity),
            price_per_quintal: Set(input.price_per_quintal),
            labour_charges: Set(input.charges.labour),
            transport_charges: Set(input.charges.transport),
            other_charges: Set(input.charges.other),
            total_amount: Set(total_amount),
            paid_amount: Set(Decimal::ZERO),
            pending_amount: Set(total_amount),
            payment_status: Set(status.into()),
            date: Set(ts),
            inventory: Set(InventoryTrail(vec![ledger.snapshot(input.party)])),
            created_at: Set(ts),
            updated_at: Set(ts),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        tracing::info!(crop_id = %crop.crop_id, "crop recorded");
        Ok(crop)
    }

    /// Deletes an unpaid crop, rolling its contribution back out of the
    /// stock ledger. The ledger row itself is removed once it returns
    /// to zero.
    ///
    /// # Errors
    ///
    /// Returns `PaymentAlreadyStarted` once any amount has been paid
    /// against the crop.
    pub async fn delete_crop(&self, dealer_id: DealerId, crop_business_id: &str) -> AppResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let crop = find(&txn, dealer_id, crop_business_id).await?;

        if crop.paid_amount > Decimal::ZERO
            || crop.payment_status != sea_orm_active_enums::PaymentStatus::NotDone
        {
            return Err(AppError::PaymentAlreadyStarted(format!(
                "Crop {crop_business_id} already has payments"
            )));
        }

        let existing = inventory::fetch(&txn, dealer_id, &crop.crop_type)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Inventory for {}", crop.crop_type)))?;
        let mut ledger = existing.to_ledger();

        let charges = Charges {
            labour: crop.labour_charges,
            transport: crop.transport_charges,
            other: crop.other_charges,
        };

        match PartyKind::from(crop.person_type) {
            PartyKind::Farmer => ledger.reverse_buy(
                crop.quantity,
                crop.no_of_gunny,
                crop.total_amount,
                crop.pending_amount,
                charges,
            ),
            PartyKind::Buyer => ledger.reverse_sell(
                crop.quantity,
                crop.no_of_gunny,
                crop.total_amount,
                crop.pending_amount,
                charges,
            ),
        }

        inventory::persist(&txn, Some(existing), &ledger, dealer_id, &crop.crop_type).await?;

        crop.delete(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    /// Finds a crop by business ID within the dealer's tenancy.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent or owned by another dealer.
    pub async fn find_by_business_id(
        &self,
        dealer_id: DealerId,
        crop_business_id: &str,
    ) -> AppResult<crops::Model> {
        find(&self.db, dealer_id, crop_business_id).await
    }

    /// Lists a party's crops, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_person(
        &self,
        dealer_id: DealerId,
        person_business_id: &str,
    ) -> AppResult<Vec<crops::Model>> {
        crops::Entity::find()
            .filter(crops::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(crops::Column::PersonBusinessId.eq(person_business_id))
            .order_by_desc(crops::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists a party's crops that still carry a pending balance, oldest
    /// first (the payment engine's allocation order).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_pending_for_person(
        &self,
        dealer_id: DealerId,
        person_business_id: &str,
    ) -> AppResult<Vec<crops::Model>> {
        crops::Entity::find()
            .filter(crops::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(crops::Column::PersonBusinessId.eq(person_business_id))
            .filter(crops::Column::PendingAmount.gt(Decimal::ZERO))
            .order_by_asc(crops::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}

/// Crop lookup on the caller's connection or transaction.
pub(crate) async fn find<C: ConnectionTrait>(
    conn: &C,
    dealer_id: DealerId,
    crop_business_id: &str,
) -> AppResult<crops::Model> {
    crops::Entity::find()
        .filter(crops::Column::DealerId.eq(dealer_id.into_inner()))
        .filter(crops::Column::CropId.eq(crop_business_id))
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::NotFound(format!("Crop {crop_business_id}")))
}

/// Loads the pending crops among `ids`, oldest first, verifying tenancy.
pub(crate) async fn load_pending_by_ids<C: ConnectionTrait>(
    conn: &C,
    dealer_id: DealerId,
    ids: &[Uuid],
) -> AppResult<Vec<crops::Model>> {
    crops::Entity::find()
        .filter(crops::Column::DealerId.eq(dealer_id.into_inner()))
        .filter(crops::Column::Id.is_in(ids.iter().copied()))
        .filter(crops::Column::PendingAmount.gt(Decimal::ZERO))
        .order_by_asc(crops::Column::CreatedAt)
        .all(conn)
        .await
        .map_err(db_err)
}
