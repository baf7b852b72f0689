//! Settlement repository: nets a farmer's pending crop receivables
//! against their loan debt in one atomic stroke, and reverses a
//! settlement symmetrically across both sides.

use chrono::Utc;
use mandi_core::loan::{accrue, Accrual};
use mandi_core::payment::allocate;
use mandi_core::settlement::{net, residual_pending, Direction};
use mandi_core::status::{LoanStatus, PaymentStatus};
use mandi_core::types::PartyKind;
use mandi_shared::types::{business_id, DealerId, Scope};
use mandi_shared::{AppError, AppResult};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use super::{crop, db_err, farmer, inventory, loan, loan_summary, now, CounterRepository};
use crate::entities::snapshots::{
    CropAllocationLine, CropAllocations, LoanAllocationLine, LoanAllocations, STATUS_REVERSED,
};
use crate::entities::{crops, loans, settlements};

/// Per-crop-type ledger cache for one settlement transaction.
type LedgerMap = HashMap<
    String,
    (
        Option<crate::entities::inventories::Model>,
        Option<mandi_core::inventory::StockLedger>,
    ),
>;

/// Input for settling a farmer's crops against their loans.
#[derive(Debug, Clone)]
pub struct SettleInput {
    /// The farmer's business ID (`FM-n`).
    pub farmer_business_id: String,
    /// Row IDs of the pending crops entering the settlement.
    pub crop_ids: Vec<Uuid>,
    /// Row IDs of the outstanding loans entering the settlement.
    pub loan_ids: Vec<Uuid>,
    /// Cash handed over on top of the netted value.
    pub extra_cash: Decimal,
}

/// Settlement repository.
#[derive(Debug, Clone)]
pub struct SettlementRepository {
    db: DatabaseConnection,
}

impl SettlementRepository {
    /// Creates a new settlement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Settles the selected crops against the selected loans. Interest
    /// accrues on every selected loan first; the side with the smaller
    /// pending total closes fully, and the other side absorbs the
    /// netted value plus any extra cash FIFO, partial allocation
    /// permitted.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty selection or negative cash,
    /// and `NotFound` for an unknown farmer or when none of the
    /// selected records remain pending.
    pub async fn settle(
        &self,
        dealer_id: DealerId,
        input: SettleInput,
    ) -> AppResult<settlements::Model> {
        if input.extra_cash < Decimal::ZERO {
            return Err(AppError::Validation("Extra cash cannot be negative".into()));
        }
        if input.crop_ids.is_empty() && input.loan_ids.is_empty() {
            return Err(AppError::Validation(
                "Select at least one crop or loan".into(),
            ));
        }

        let txn = self.db.begin().await.map_err(db_err)?;

        let borrower = farmer::find(&txn, dealer_id, &input.farmer_business_id).await?;

        let crop_targets = crop::load_pending_by_ids(&txn, dealer_id, &input.crop_ids).await?;
        let loan_targets = loan::load_pending_by_ids(&txn, dealer_id, &input.loan_ids).await?;
        if crop_targets.is_empty() && loan_targets.is_empty() {
            return Err(AppError::NotFound(
                "No pending crops or loans to settle".into(),
            ));
        }
        if crop_targets.iter().any(|c| {
            c.person_business_id != input.farmer_business_id
                || PartyKind::from(c.person_type) != PartyKind::Farmer
        }) {
            return Err(AppError::Validation(
                "Selected crops were not bought from this farmer".into(),
            ));
        }
        if loan_targets
            .iter()
            .any(|l| l.farmer_business_id != input.farmer_business_id)
        {
            return Err(AppError::Validation(
                "Selected loans belong to another farmer".into(),
            ));
        }

        let ts = now();
        let as_of = ts.with_timezone(&Utc);

        let accruals: Vec<Accrual> = loan_targets
            .iter()
            .map(|l| {
                accrue(
                    l.loan_amount,
                    l.pending_amount,
                    l.interest_rate,
                    l.updated_at.with_timezone(&Utc),
                    as_of,
                )
            })
            .collect();

        let crop_total: Decimal = crop_targets.iter().map(|c| c.pending_amount).sum();
        let loan_total: Decimal = accruals.iter().map(|a| a.total_payable).sum();
        let netting = net(crop_total, loan_total);

        let summary_row = loan_summary::fetch(&txn, dealer_id).await?;
        let mut summary = summary_row
            .as_ref()
            .map(|m| m.to_ledger())
            .unwrap_or_default();

        let mut ledgers = LedgerMap::new();
        for target in &crop_targets {
            if !ledgers.contains_key(&target.crop_type) {
                let existing = inventory::fetch(&txn, dealer_id, &target.crop_type).await?;
                let ledger = existing.as_ref().map(|m| m.to_ledger());
                ledgers.insert(target.crop_type.clone(), (existing, ledger));
            }
        }

        let mut crop_lines = Vec::new();
        let mut loan_lines = Vec::new();

        match netting.direction {
            Direction::DealerToFarmer => {
                // Loans close in full; the freed value plus the cash
                // pays down crops oldest-first.
                for (target, accrual) in loan_targets.into_iter().zip(&accruals) {
                    loan_lines
                        .push(close_loan(&txn, &mut summary, target, accrual, None, ts).await?);
                }

                let budget = (input.extra_cash + loan_total).min(crop_total);
                let pendings: Vec<Decimal> =
                    crop_targets.iter().map(|c| c.pending_amount).collect();
                let allocations = allocate(&pendings, budget)?;
                for (target, allocation) in crop_targets.into_iter().zip(allocations) {
                    if allocation.paid.is_zero() {
                        break;
                    }
                    crop_lines.push(
                        pay_crop(&txn, &mut ledgers, target, allocation.paid, ts).await?,
                    );
                }
            }
            Direction::FarmerToDealer => {
                // Crops close in full; their value plus the cash pays
                // down loans oldest-first, interest first.
                for target in crop_targets {
                    let pending = target.pending_amount;
                    crop_lines.push(pay_crop(&txn, &mut ledgers, target, pending, ts).await?);
                }

                let budget = (input.extra_cash + crop_total).min(loan_total);
                let payables: Vec<Decimal> = accruals.iter().map(|a| a.total_payable).collect();
                let allocations = allocate(&payables, budget)?;
                for ((target, accrual), allocation) in
                    loan_targets.into_iter().zip(&accruals).zip(allocations)
                {
                    if allocation.paid.is_zero() {
                        break;
                    }
                    loan_lines.push(
                        close_loan(&txn, &mut summary, target, accrual, Some(allocation.paid), ts)
                            .await?,
                    );
                }
            }
            Direction::Settled => {
                // Exact net-zero: both sides close in full.
                for target in crop_targets {
                    let pending = target.pending_amount;
                    crop_lines.push(pay_crop(&txn, &mut ledgers, target, pending, ts).await?);
                }
                for (target, accrual) in loan_targets.into_iter().zip(&accruals) {
                    loan_lines
                        .push(close_loan(&txn, &mut summary, target, accrual, None, ts).await?);
                }
            }
        }

        for (crop_type, (existing, ledger)) in ledgers {
            if let Some(ledger) = ledger {
                inventory::persist(&txn, existing, &ledger, dealer_id, &crop_type).await?;
            }
        }
        if !loan_lines.is_empty() {
            loan_summary::persist(&txn, summary_row, &summary, dealer_id).await?;
        }

        let seq = CounterRepository::next_sequence(
            &txn,
            &Scope::Settlement {
                dealer: dealer_id,
                farmer: &input.farmer_business_id,
            }
            .key(),
        )
        .await
        .map_err(db_err)?;

        let pending_amount = residual_pending(netting.net_amount, input.extra_cash);
        let status = if pending_amount.is_zero() {
            PaymentStatus::Done
        } else {
            PaymentStatus::PartialDone
        };

        let settlement = settlements::ActiveModel {
            id: Set(Uuid::now_v7()),
            dealer_id: Set(dealer_id.into_inner()),
            settlement_id: Set(business_id::settlement_id(&input.farmer_business_id, seq)),
            farmer_ref_id: Set(borrower.id),
            farmer_name: Set(borrower.name),
            farmer_business_id: Set(input.farmer_business_id),
            crop_payments: Set(CropAllocations(crop_lines)),
            loan_payments: Set(LoanAllocations(loan_lines)),
            total_crop_amount: Set(crop_total),
            total_loan_amount: Set(loan_total),
            net_amount: Set(netting.net_amount),
            settlement_direction: Set(netting.direction.into()),
            paid_amount: Set(input.extra_cash),
            pending_amount: Set(pending_amount),
            status: Set(status.into()),
            is_reversal: Set(false),
            reversed_settlement_id: Set(None),
            date: Set(ts),
            created_at: Set(ts),
            updated_at: Set(ts),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        tracing::info!(
            settlement_id = %settlement.settlement_id,
            direction = %netting.direction,
            "settlement recorded"
        );
        Ok(settlement)
    }

    /// Reverses a settlement: restores every crop and loan it touched
    /// to its pre-settlement paid/pending/status from the stored
    /// allocation lines, unwinds the inventory and summary
    /// contributions, and writes a reversal record with negated
    /// amounts.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown settlement and
    /// `AlreadyReversed` for a second reversal.
    pub async fn reverse_settlement(
        &self,
        dealer_id: DealerId,
        settlement_business_id: &str,
    ) -> AppResult<settlements::Model> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let original = settlements::Entity::find()
            .filter(settlements::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(settlements::Column::SettlementId.eq(settlement_business_id))
            .filter(settlements::Column::IsReversal.eq(false))
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("Settlement {settlement_business_id}")))?;

        let reversed = settlements::Entity::find()
            .filter(settlements::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(settlements::Column::SettlementId.eq(&original.settlement_id))
            .filter(settlements::Column::IsReversal.eq(true))
            .one(&txn)
            .await
            .map_err(db_err)?;
        if reversed.is_some() {
            return Err(AppError::AlreadyReversed(format!(
                "Settlement {settlement_business_id} already reversed"
            )));
        }

        let summary_row = loan_summary::fetch(&txn, dealer_id).await?;
        let mut summary = summary_row
            .as_ref()
            .map(|m| m.to_ledger())
            .unwrap_or_default();

        let ts = now();
        let mut ledgers = LedgerMap::new();
        let mut crop_lines = Vec::new();
        let mut loan_lines = Vec::new();

        let mut crop_pending_before = Decimal::ZERO;
        let mut crop_reversed = Decimal::ZERO;
        for line in &original.crop_payments.0 {
            crop_pending_before += line.pending_before;
            crop_reversed += line.paid_amount;

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
            active.updated_at = Set(ts);
            active.update(&txn).await.map_err(db_err)?;

            if !ledgers.contains_key(&target.crop_type) {
                let existing = inventory::fetch(&txn, dealer_id, &target.crop_type).await?;
                let ledger = existing.as_ref().map(|m| m.to_ledger());
                ledgers.insert(target.crop_type.clone(), (existing, ledger));
            }
            let snapshot = match ledgers.get_mut(&target.crop_type) {
                Some((_, Some(ledger))) => {
                    ledger.reverse_payment(PartyKind::Farmer, amount);
                    vec![ledger.snapshot(PartyKind::Farmer)]
                }
                _ => Vec::new(),
            };

            crop_lines.push(CropAllocationLine {
                paid_amount: -amount,
                pending_after: line.pending_before,
                status_after: STATUS_REVERSED.to_string(),
                inventory: snapshot,
                ..line.clone()
            });
        }

        let mut loan_payable_before = Decimal::ZERO;
        let mut loan_reversed = Decimal::ZERO;
        for line in &original.loan_payments.0 {
            loan_payable_before += line.total_payable_before;
            loan_reversed += line.paid_amount;

            let target = loans::Entity::find_by_id(line.loan_id)
                .filter(loans::Column::DealerId.eq(dealer_id.into_inner()))
                .one(&txn)
                .await
                .map_err(db_err)?
                .ok_or_else(|| AppError::NotFound(format!("Loan {}", line.loan_business_id)))?;

            let amount = line.paid_amount.abs();
            let paid_after = target.paid_amount - amount;
            let pending_after = line.principal_pending_before;
            let interest_after = target.interest_amount - line.interest_amount;
            let status = LoanStatus::derive(paid_after, pending_after);

            let was_finished = line.loan_status_after == LoanStatus::Finished.as_str();
            if was_finished && pending_after > Decimal::ZERO {
                summary.unmark_finished();
            }
            summary.reverse_payment(amount, line.interest_amount);

            let mut active: loans::ActiveModel = target.into();
            active.paid_amount = Set(paid_after);
            active.pending_amount = Set(pending_after);
            active.interest_amount = Set(interest_after);
            active.status = Set(status.into());
            active.updated_at = Set(ts);
            active.update(&txn).await.map_err(db_err)?;

            loan_lines.push(LoanAllocationLine {
                paid_amount: -amount,
                pending_amount_after: line.principal_pending_before,
                loan_status_after: STATUS_REVERSED.to_string(),
                summary: vec![summary.snapshot()],
                ..line.clone()
            });
        }

        for (crop_type, (existing, ledger)) in ledgers {
            if let Some(ledger) = ledger {
                inventory::persist(&txn, existing, &ledger, dealer_id, &crop_type).await?;
            }
        }
        if !loan_lines.is_empty() {
            loan_summary::persist(&txn, summary_row, &summary, dealer_id).await?;
        }

        let seq = CounterRepository::next_sequence(
            &txn,
            &Scope::SettlementReversal {
                dealer: dealer_id,
                farmer: &original.farmer_business_id,
            }
            .key(),
        )
        .await
        .map_err(db_err)?;

        let net_amount = -original.net_amount;
        let pending_amount = original.net_amount.abs();
        let status = if pending_amount.is_zero() {
            PaymentStatus::Done
        } else {
            PaymentStatus::PartialDone
        };

        let reversal = settlements::ActiveModel {
            id: Set(Uuid::now_v7()),
            dealer_id: Set(dealer_id.into_inner()),
            settlement_id: Set(original.settlement_id.clone()),
            farmer_ref_id: Set(original.farmer_ref_id),
            farmer_name: Set(original.farmer_name.clone()),
            farmer_business_id: Set(original.farmer_business_id.clone()),
            crop_payments: Set(CropAllocations(crop_lines)),
            loan_payments: Set(LoanAllocations(loan_lines)),
            total_crop_amount: Set(crop_pending_before - crop_reversed),
            total_loan_amount: Set(loan_payable_before - loan_reversed),
            net_amount: Set(net_amount),
            settlement_direction: Set(Direction::from_net(net_amount).into()),
            paid_amount: Set(-original.paid_amount),
            pending_amount: Set(pending_amount),
            status: Set(status.into()),
            is_reversal: Set(true),
            reversed_settlement_id: Set(Some(business_id::settlement_reversal_id(
                &original.farmer_business_id,
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
        tracing::info!(settlement_id = %reversal.settlement_id, "settlement reversed");
        Ok(reversal)
    }

    /// Finds a settlement by business ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent or owned by another dealer.
    pub async fn find_by_business_id(
        &self,
        dealer_id: DealerId,
        settlement_business_id: &str,
    ) -> AppResult<settlements::Model> {
        settlements::Entity::find()
            .filter(settlements::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(settlements::Column::SettlementId.eq(settlement_business_id))
            .filter(settlements::Column::IsReversal.eq(false))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("Settlement {settlement_business_id}")))
    }

    /// Lists a farmer's settlements, reversals included, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_farmer(
        &self,
        dealer_id: DealerId,
        farmer_business_id: &str,
    ) -> AppResult<Vec<settlements::Model>> {
        settlements::Entity::find()
            .filter(settlements::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(settlements::Column::FarmerBusinessId.eq(farmer_business_id))
            .order_by_desc(settlements::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}

/// Pays `amount` against one crop inside a settlement, updating the
/// crop row and the crop type's stock ledger, and returns the
/// allocation line.
async fn pay_crop<C: ConnectionTrait>(
    txn: &C,
    ledgers: &mut LedgerMap,
    target: crops::Model,
    amount: Decimal,
    ts: sea_orm::prelude::DateTimeWithTimeZone,
) -> AppResult<CropAllocationLine> {
    let pending_before = target.pending_amount;
    let paid_after = target.paid_amount + amount;
    let pending_after = pending_before - amount;
    let status = PaymentStatus::derive(paid_after, pending_after);

    let snapshot = match ledgers.get_mut(&target.crop_type) {
        Some((_, Some(ledger))) => {
            ledger.apply_payment(PartyKind::Farmer, amount);
            vec![ledger.snapshot(PartyKind::Farmer)]
        }
        _ => Vec::new(),
    };

    let line = CropAllocationLine {
        crop_id: target.id,
        crop_business_id: target.crop_id.clone(),
        crop_type: target.crop_type.clone(),
        quantity: target.quantity,
        price_per_quintal: target.price_per_quintal,
        total_amount: target.total_amount,
        pending_before,
        paid_amount: amount,
        pending_after,
        status_after: status.as_str().to_string(),
        inventory: snapshot,
    };

    let mut active: crops::ActiveModel = target.into();
    active.paid_amount = Set(paid_after);
    active.pending_amount = Set(pending_after);
    active.payment_status = Set(status.into());
    active.updated_at = Set(ts);
    active.update(txn).await.map_err(db_err)?;

    Ok(line)
}

/// Pays one loan inside a settlement: in full when `partial` is `None`
/// (the loan finishes), or by the given amount otherwise. Folds the
/// accrued interest and the repayment into the summary and returns the
/// allocation line.
async fn close_loan<C: ConnectionTrait>(
    txn: &C,
    summary: &mut mandi_core::loan::SummaryLedger,
    target: loans::Model,
    accrual: &Accrual,
    partial: Option<Decimal>,
    ts: sea_orm::prelude::DateTimeWithTimeZone,
) -> AppResult<LoanAllocationLine> {
    let pay = partial.unwrap_or(accrual.total_payable);
    let pending_after = accrual.total_payable - pay;
    let paid_after = target.paid_amount + pay;
    let status = LoanStatus::derive(paid_after, pending_after);

    summary.record_payment(pay, accrual.interest);
    if status == LoanStatus::Finished {
        summary.mark_finished();
    }

    let line = LoanAllocationLine {
        loan_id: target.id,
        loan_business_id: target.loan_id.clone(),
        loan_amount: target.loan_amount,
        principal_pending_before: accrual.principal_pending,
        interest_rate: target.interest_rate,
        period_in_days: accrual.days,
        interest_amount: accrual.interest,
        total_payable_before: accrual.total_payable,
        paid_amount: pay,
        pending_amount_after: pending_after,
        loan_status_after: status.as_str().to_string(),
        summary: vec![summary.snapshot()],
    };

    let interest_after = target.interest_amount + accrual.interest;
    let mut active: loans::ActiveModel = target.into();
    active.paid_amount = Set(paid_after);
    active.pending_amount = Set(pending_after);
    active.interest_amount = Set(interest_after);
    active.period_in_days = Set(accrual.days);
    active.status = Set(status.into());
    active.updated_at = Set(ts);
    active.update(txn).await.map_err(db_err)?;

    Ok(line)
}
