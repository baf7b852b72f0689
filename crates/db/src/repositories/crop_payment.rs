//! Crop payment repository: FIFO settlement of pending crop balances
//! and immutable reversal records.

use mandi_core::payment::allocate;
use mandi_core::status::PaymentStatus;
use mandi_core::types::{PartyKind, PaymentMode};
use mandi_shared::types::{business_id, DealerId, Scope};
use mandi_shared::{AppError, AppResult};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use super::{buyer, crop, db_err, farmer, inventory, now, CounterRepository};
use crate::entities::snapshots::{CropAllocationLine, CropAllocations, STATUS_REVERSED};
use crate::entities::{crop_payments, crops, settlements};

/// Input for a payment against one party's pending crops.
#[derive(Debug, Clone)]
pub struct ApplyCropPaymentInput {
    /// Which side of the trade the counterparty is on.
    pub party: PartyKind,
    /// The counterparty's business ID (`FM-n` or `BR-n`).
    pub person_business_id: String,
    /// How the money moved.
    pub mode: PaymentMode,
    /// Total amount paid.
    pub amount: Decimal,
    /// Row IDs of the crops the payment targets.
    pub crop_ids: Vec<Uuid>,
}

/// Crop payment repository.
#[derive(Debug, Clone)]
pub struct CropPaymentRepository {
    db: DatabaseConnection,
}

impl CropPaymentRepository {
    /// Creates a new crop payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Applies a payment to the party's selected pending crops, oldest
    /// first, updating each crop, the stock ledger, and writing the
    /// payment record with its allocation lines, atomically.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-positive amount or an empty
    /// target list, `NotFound` for an unknown party or no remaining
    /// pending crops, and `Overpayment` when the amount exceeds the
    /// pending total of the targeted crops.
    pub async fn apply_payment(
        &self,
        dealer_id: DealerId,
        input: ApplyCropPaymentInput,
    ) -> AppResult<crop_payments::Model> {
        if input.amount <= Decimal::ZERO {
            return Err(AppError::Validation("Paid amount must be positive".into()));
        }
        if input.crop_ids.is_empty() {
            return Err(AppError::Validation("No crops selected".into()));
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

        let targets = crop::load_pending_by_ids(&txn, dealer_id, &input.crop_ids).await?;
        if targets.is_empty() {
            return Err(AppError::NotFound("No pending crops to pay".into()));
        }
        if targets
            .iter()
            .any(|c| c.person_business_id != input.person_business_id)
        {
            return Err(AppError::Validation(
                "Selected crops belong to another party".into(),
            ));
        }

        let pendings: Vec<Decimal> = targets.iter().map(|c| c.pending_amount).collect();
        let total_crop_amount: Decimal = pendings.iter().copied().sum();
        let allocations = allocate(&pendings, input.amount)?;

        // One ledger per crop type; a payment may span several types.
        let mut ledgers = HashMap::new();
        for target in &targets {
            if !ledgers.contains_key(&target.crop_type) {
                let existing = inventory::fetch(&txn, dealer_id, &target.crop_type).await?;
                let ledger = existing.as_ref().map(|m| m.to_ledger());
                ledgers.insert(target.crop_type.clone(), (existing, ledger));
            }
        }

        let mut lines = Vec::new();
        for (target, allocation) in targets.into_iter().zip(allocations) {
            if allocation.paid.is_zero() {
                break;
            }

            let paid_after = target.paid_amount + allocation.paid;
            let status = PaymentStatus::derive(paid_after, allocation.pending_after);

            let snapshot = match ledgers.get_mut(&target.crop_type) {
                Some((_, Some(ledger))) => {
                    ledger.apply_payment(input.party, allocation.paid);
                    vec![ledger.snapshot(input.party)]
                }
                _ => Vec::new(),
            };

            lines.push(CropAllocationLine {
                crop_id: target.id,
                crop_business_id: target.crop_id.clone(),
                crop_type: target.crop_type.clone(),
                quantity: target.quantity,
                price_per_quintal: target.price_per_quintal,
                total_amount: target.total_amount,
                pending_before: allocation.pending_before,
                paid_amount: allocation.paid,
                pending_after: allocation.pending_after,
                status_after: status.as_str().to_string(),
                inventory: snapshot,
            });

            let mut active: crops::ActiveModel = target.into();
            active.paid_amount = Set(paid_after);
            active.pending_amount = Set(allocation.pending_after);
            active.payment_status = Set(status.into());
            active.updated_at = Set(now());
            active.update(&txn).await.map_err(db_err)?;
        }

        for (crop_type, (existing, ledger)) in ledgers {
            if let Some(ledger) = ledger {
                inventory::persist(&txn, existing, &ledger, dealer_id, &crop_type).await?;
            }
        }

        let seq = CounterRepository::next_sequence(
            &txn,
            &Scope::Payment {
                dealer: dealer_id,
                party: &input.person_business_id,
            }
            .key(),
        )
        .await
        .map_err(db_err)?;

        let pending_amount = total_crop_amount - input.amount;
        let ts = now();

        let payment = crop_payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            dealer_id: Set(dealer_id.into_inner()),
            payment_id: Set(business_id::crop_payment_id(
                &input.person_business_id,
                seq,
            )),
            person_type: Set(input.party.into()),
            person_ref_id: Set(person_ref_id),
            person_business_id: Set(input.person_business_id),
            person_name: Set(person_name),
            mode: Set(input.mode.into()),
            payments: Set(CropAllocations(lines)),
            total_crop_amount: Set(total_crop_amount),
            amount_paid: Set(input.amount),
            pending_amount: Set(pending_amount),
            status: Set(PaymentStatus::derive(input.amount, pending_amount).into()),
            is_reversal: Set(false),
            reversed_payment_id: Set(None),
            date: Set(ts),
            created_at: Set(ts),
            updated_at: Set(ts),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        tracing::info!(payment_id = %payment.payment_id, "crop payment applied");
        Ok(payment)
    }

    /// Reverses a crop payment: restores each allocated crop's pending
    /// balance, unwinds the stock ledger, and writes a reversal record
    /// with negated amounts. The original row is never touched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown payment, `AlreadyReversed`
    /// for a second reversal, and `LockedBySettlement` when any of the
    /// paid crops has since been pulled into a settlement.
    pub async fn reverse_payment(
        &self,
        dealer_id: DealerId,
        payment_business_id: &str,
    ) -> AppResult<crop_payments::Model> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let original = crop_payments::Entity::find()
            .filter(crop_payments::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(crop_payments::Column::PaymentId.eq(payment_business_id))
            .filter(crop_payments::Column::IsReversal.eq(false))
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("Payment {payment_business_id}")))?;

        let reversed = crop_payments::Entity::find()
            .filter(crop_payments::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(crop_payments::Column::PaymentId.eq(&original.payment_id))
            .filter(crop_payments::Column::IsReversal.eq(true))
            .one(&txn)
            .await
            .map_err(db_err)?;
        if reversed.is_some() {
            return Err(AppError::AlreadyReversed(format!(
                "Payment {payment_business_id} already reversed"
            )));
        }

        let crop_ids: Vec<Uuid> = original.payments.0.iter().map(|l| l.crop_id).collect();
        if crops_locked_by_settlement(&txn, dealer_id, &original.person_business_id, &crop_ids)
            .await?
        {
            return Err(AppError::LockedBySettlement(format!(
                "Payment {payment_business_id} is part of a settlement"
            )));
        }

        let mut ledgers = HashMap::new();
        let party = PartyKind::from(original.person_type);
        let mut lines = Vec::new();
        let mut total_pending_before = Decimal::ZERO;
        let mut total_reversed = Decimal::ZERO;

        for line in &original.payments.0 {
            total_pending_before += line.pending_before;
            total_reversed += line.paid_amount;

            let target = crops::Entity::find_by_id(line.crop_id)
                .filter(crops::Column::DealerId.eq(dealer_id.into_inner()))
                .one(&txn)
                .await
                .map_err(db_err)?
                .ok_or_else(|| AppError::NotFound(format!("Crop {}", line.crop_business_id)))?;

            let amount = line.paid_amount.abs();
            let paid_after = target.paid_amount - amount;
            let pending_after = target.pending_amount + amount;
            let status = PaymentStatus::derive(paid_after, pending_after);

            let mut active: crops::ActiveModel = target.clone().into();
            active.paid_amount = Set(paid_after);
            active.pending_amount = Set(pending_after);
            active.payment_status = Set(status.into());
            active.updated_at = Set(now());
            active.update(&txn).await.map_err(db_err)?;

            if !ledgers.contains_key(&target.crop_type) {
                let existing = inventory::fetch(&txn, dealer_id, &target.crop_type).await?;
                let ledger = existing.as_ref().map(|m| m.to_ledger());
                ledgers.insert(target.crop_type.clone(), (existing, ledger));
            }
            let snapshot = match ledgers.get_mut(&target.crop_type) {
                Some((_, Some(ledger))) => {
                    ledger.reverse_payment(party, amount);
                    vec![ledger.snapshot(party)]
                }
                _ => Vec::new(),
            };

            lines.push(CropAllocationLine {
                paid_amount: -amount,
                pending_after: line.pending_before,
                status_after: STATUS_REVERSED.to_string(),
                inventory: snapshot,
                ..line.clone()
            });
        }

        for (crop_type, (existing, ledger)) in ledgers {
            if let Some(ledger) = ledger {
                inventory::persist(&txn, existing, &ledger, dealer_id, &crop_type).await?;
            }
        }

        let seq = CounterRepository::next_sequence(
            &txn,
            &Scope::PaymentReversal {
                dealer: dealer_id,
                party: &original.person_business_id,
            }
            .key(),
        )
        .await
        .map_err(db_err)?;

        let ts = now();
        let reversal = crop_payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            dealer_id: Set(dealer_id.into_inner()),
            payment_id: Set(original.payment_id.clone()),
            person_type: Set(original.person_type),
            person_ref_id: Set(original.person_ref_id),
            person_business_id: Set(original.person_business_id.clone()),
            person_name: Set(original.person_name.clone()),
            mode: Set(original.mode),
            payments: Set(CropAllocations(lines)),
            total_crop_amount: Set(total_pending_before - total_reversed),
            amount_paid: Set(total_reversed),
            pending_amount: Set(total_pending_before),
            status: Set(PaymentStatus::derive(total_reversed, total_pending_before).into()),
            is_reversal: Set(true),
            reversed_payment_id: Set(Some(business_id::crop_payment_reversal_id(
                &original.person_business_id,
                seq,
            ))),
            date: Set(ts),
            created_at: Set(ts),
            updated_at: Set(ts),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        tracing::info!(payment_id = %reversal.payment_id, "crop payment reversed");
        Ok(reversal)
    }

    /// Finds a payment record by business ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent or owned by another dealer.
    pub async fn find_by_business_id(
        &self,
        dealer_id: DealerId,
        payment_business_id: &str,
    ) -> AppResult<crop_payments::Model> {
        crop_payments::Entity::find()
            .filter(crop_payments::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(crop_payments::Column::PaymentId.eq(payment_business_id))
            .filter(crop_payments::Column::IsReversal.eq(false))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("Payment {payment_business_id}")))
    }

    /// Lists a party's payment records, reversals included, newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_person(
        &self,
        dealer_id: DealerId,
        person_business_id: &str,
    ) -> AppResult<Vec<crop_payments::Model>> {
        use sea_orm::QueryOrder;

        crop_payments::Entity::find()
            .filter(crop_payments::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(crop_payments::Column::PersonBusinessId.eq(person_business_id))
            .order_by_desc(crop_payments::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}

/// True when any settlement of the party references one of `crop_ids`.
/// A settled crop's payment history is frozen until the settlement is
/// itself reversed.
pub(crate) async fn crops_locked_by_settlement<C: ConnectionTrait>(
    conn: &C,
    dealer_id: DealerId,
    person_business_id: &str,
    crop_ids: &[Uuid],
) -> AppResult<bool> {
    let rows = settlements::Entity::find()
        .filter(settlements::Column::DealerId.eq(dealer_id.into_inner()))
        .filter(settlements::Column::FarmerBusinessId.eq(person_business_id))
        .filter(settlements::Column::IsReversal.eq(false))
        .all(conn)
        .await
        .map_err(db_err)?;

    for row in rows {
        let reversed = settlements::Entity::find()
            .filter(settlements::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(settlements::Column::SettlementId.eq(&row.settlement_id))
            .filter(settlements::Column::IsReversal.eq(true))
            .one(conn)
            .await
            .map_err(db_err)?;
        if reversed.is_some() {
            continue;
        }
        if row
            .crop_payments
            .0
            .iter()
            .any(|l| crop_ids.contains(&l.crop_id))
        {
            return Ok(true);
        }
    }
    Ok(false)
}
