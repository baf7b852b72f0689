//! Loan payment repository: lazy interest accrual, FIFO repayment over
//! outstanding loans, and immutable reversal records.

use chrono::Utc;
use mandi_core::loan::accrue;
use mandi_core::payment::allocate;
use mandi_core::status::{LoanStatus, PaymentStatus};
use mandi_core::types::PaymentMode;
use mandi_shared::types::{business_id, DealerId, Scope};
use mandi_shared::{AppError, AppResult};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use uuid::Uuid;

use super::{db_err, farmer, loan, loan_summary, now, CounterRepository};
use crate::entities::snapshots::{LoanAllocationLine, LoanAllocations, STATUS_REVERSED};
use crate::entities::{loan_payments, loans, settlements};

/// Input for a repayment against a farmer's outstanding loans.
#[derive(Debug, Clone)]
pub struct ApplyLoanPaymentInput {
    /// The borrowing farmer's business ID (`FM-n`).
    pub farmer_business_id: String,
    /// How the money moved.
    pub mode: PaymentMode,
    /// Total amount received from the farmer.
    pub amount: Decimal,
    /// Row IDs of the loans the repayment targets.
    pub loan_ids: Vec<Uuid>,
}

/// Loan payment repository.
#[derive(Debug, Clone)]
pub struct LoanPaymentRepository {
    db: DatabaseConnection,
}

impl LoanPaymentRepository {
    /// Creates a new loan payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Applies a repayment to the farmer's selected loans, oldest
    /// first. Each touched loan first accrues interest for the days
    /// since its last save, then absorbs as much of the remaining
    /// amount as its principal-plus-interest allows.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-positive amount or an empty
    /// target list, `NotFound` for an unknown farmer or no remaining
    /// outstanding loans, and `Overpayment` when the amount exceeds
    /// the accrued payable total of the targeted loans.
    pub async fn apply_payment(
        &self,
        dealer_id: DealerId,
        input: ApplyLoanPaymentInput,
    ) -> AppResult<loan_payments::Model> {
        if input.amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Received amount must be positive".into(),
            ));
        }
        if input.loan_ids.is_empty() {
            return Err(AppError::Validation("No loans selected".into()));
        }

        let txn = self.db.begin().await.map_err(db_err)?;

        let borrower = farmer::find(&txn, dealer_id, &input.farmer_business_id).await?;

        let targets = loan::load_pending_by_ids(&txn, dealer_id, &input.loan_ids).await?;
        if targets.is_empty() {
            return Err(AppError::NotFound("No outstanding loans to pay".into()));
        }
        if targets
            .iter()
            .any(|l| l.farmer_business_id != input.farmer_business_id)
        {
            return Err(AppError::Validation(
                "Selected loans belong to another farmer".into(),
            ));
        }

        let ts = now();
        let as_of = ts.with_timezone(&Utc);

        let accruals: Vec<_> = targets
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

        let payables: Vec<Decimal> = accruals.iter().map(|a| a.total_payable).collect();
        let allocations = allocate(&payables, input.amount)?;

        let existing = loan_summary::fetch(&txn, dealer_id).await?;
        let mut summary = existing.as_ref().map(|m| m.to_ledger()).unwrap_or_default();

        // Header totals count only the loans the money reached.
        let mut total_loan_amount = Decimal::ZERO;
        let mut lines = Vec::new();
        for ((target, accrual), allocation) in
            targets.into_iter().zip(accruals).zip(allocations)
        {
            if allocation.paid.is_zero() {
                break;
            }
            total_loan_amount += accrual.total_payable;

            let paid_after = target.paid_amount + allocation.paid;
            let status = LoanStatus::derive(paid_after, allocation.pending_after);

            summary.record_payment(allocation.paid, accrual.interest);
            if status == LoanStatus::Finished {
                summary.mark_finished();
            }

            lines.push(LoanAllocationLine {
                loan_id: target.id,
                loan_business_id: target.loan_id.clone(),
                loan_amount: target.loan_amount,
                principal_pending_before: accrual.principal_pending,
                interest_rate: target.interest_rate,
                period_in_days: accrual.days,
                interest_amount: accrual.interest,
                total_payable_before: accrual.total_payable,
                paid_amount: allocation.paid,
                pending_amount_after: allocation.pending_after,
                loan_status_after: status.as_str().to_string(),
                summary: vec![summary.snapshot()],
            });

            let interest_after = target.interest_amount + accrual.interest;
            let mut active: loans::ActiveModel = target.into();
            active.paid_amount = Set(paid_after);
            active.pending_amount = Set(allocation.pending_after);
            active.interest_amount = Set(interest_after);
            active.period_in_days = Set(accrual.days);
            active.status = Set(status.into());
            active.updated_at = Set(ts);
            active.update(&txn).await.map_err(db_err)?;
        }

        loan_summary::persist(&txn, existing, &summary, dealer_id).await?;

        let seq = CounterRepository::next_sequence(
            &txn,
            &Scope::Payment {
                dealer: dealer_id,
                party: &input.farmer_business_id,
            }
            .key(),
        )
        .await
        .map_err(db_err)?;

        let pending_amount = total_loan_amount - input.amount;
        let payment = loan_payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            dealer_id: Set(dealer_id.into_inner()),
            payment_id: Set(business_id::loan_payment_id(
                &input.farmer_business_id,
                seq,
            )),
            farmer_ref_id: Set(borrower.id),
            farmer_name: Set(borrower.name),
            farmer_business_id: Set(input.farmer_business_id),
            mode: Set(input.mode.into()),
            payments: Set(LoanAllocations(lines)),
            total_loan_amount: Set(total_loan_amount),
            amount_received: Set(input.amount),
            paid_amount: Set(input.amount),
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
        tracing::info!(payment_id = %payment.payment_id, "loan payment applied");
        Ok(payment)
    }

    /// Reverses a loan payment: restores each allocated loan's
    /// principal to its pre-payment pending, backs the accrued
    /// interest out of the loan and the summary, and writes a reversal
    /// record with negated amounts.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown payment, `AlreadyReversed`
    /// for a second reversal, and `LockedBySettlement` when any of the
    /// paid loans has since been pulled into a settlement.
    pub async fn reverse_payment(
        &self,
        dealer_id: DealerId,
        payment_business_id: &str,
    ) -> AppResult<loan_payments::Model> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let original = loan_payments::Entity::find()
            .filter(loan_payments::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(loan_payments::Column::PaymentId.eq(payment_business_id))
            .filter(loan_payments::Column::IsReversal.eq(false))
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("Payment {payment_business_id}")))?;

        let reversed = loan_payments::Entity::find()
            .filter(loan_payments::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(loan_payments::Column::PaymentId.eq(&original.payment_id))
            .filter(loan_payments::Column::IsReversal.eq(true))
            .one(&txn)
            .await
            .map_err(db_err)?;
        if reversed.is_some() {
            return Err(AppError::AlreadyReversed(format!(
                "Payment {payment_business_id} already reversed"
            )));
        }

        let loan_ids: Vec<Uuid> = original.payments.0.iter().map(|l| l.loan_id).collect();
        if loans_locked_by_settlement(&txn, dealer_id, &original.farmer_business_id, &loan_ids)
            .await?
        {
            return Err(AppError::LockedBySettlement(format!(
                "Payment {payment_business_id} is part of a settlement"
            )));
        }

        let existing = loan_summary::fetch(&txn, dealer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Loan summary".into()))?;
        let mut summary = existing.to_ledger();

        let ts = now();
        let mut lines = Vec::new();
        let mut total_payable_before = Decimal::ZERO;
        let mut total_reversed = Decimal::ZERO;
        let mut total_principal_before = Decimal::ZERO;

        for line in &original.payments.0 {
            total_payable_before += line.total_payable_before;
            total_reversed += line.paid_amount;
            total_principal_before += line.principal_pending_before;

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

            lines.push(LoanAllocationLine {
                paid_amount: -amount,
                pending_amount_after: line.principal_pending_before,
                loan_status_after: STATUS_REVERSED.to_string(),
                summary: vec![summary.snapshot()],
                ..line.clone()
            });
        }

        loan_summary::persist(&txn, Some(existing), &summary, dealer_id).await?;

        let seq = CounterRepository::next_sequence(
            &txn,
            &Scope::PaymentReversal {
                dealer: dealer_id,
                party: &original.farmer_business_id,
            }
            .key(),
        )
        .await
        .map_err(db_err)?;

        let reversal = loan_payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            dealer_id: Set(dealer_id.into_inner()),
            payment_id: Set(original.payment_id.clone()),
            farmer_ref_id: Set(original.farmer_ref_id),
            farmer_name: Set(original.farmer_name.clone()),
            farmer_business_id: Set(original.farmer_business_id.clone()),
            mode: Set(original.mode),
            payments: Set(LoanAllocations(lines)),
            total_loan_amount: Set(total_payable_before - total_reversed),
            amount_received: Set(total_reversed),
            paid_amount: Set(total_reversed),
            pending_amount: Set(total_principal_before),
            status: Set(PaymentStatus::derive(total_reversed, total_principal_before).into()),
            is_reversal: Set(true),
            reversed_payment_id: Set(Some(business_id::loan_payment_reversal_id(
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
        tracing::info!(payment_id = %reversal.payment_id, "loan payment reversed");
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
    ) -> AppResult<loan_payments::Model> {
        loan_payments::Entity::find()
            .filter(loan_payments::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(loan_payments::Column::PaymentId.eq(payment_business_id))
            .filter(loan_payments::Column::IsReversal.eq(false))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("Payment {payment_business_id}")))
    }

    /// Lists a farmer's loan payment records, reversals included,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_farmer(
        &self,
        dealer_id: DealerId,
        farmer_business_id: &str,
    ) -> AppResult<Vec<loan_payments::Model>> {
        use sea_orm::QueryOrder;

        loan_payments::Entity::find()
            .filter(loan_payments::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(loan_payments::Column::FarmerBusinessId.eq(farmer_business_id))
            .order_by_desc(loan_payments::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}

/// True when any settlement of the farmer references one of `loan_ids`.
pub(crate) async fn loans_locked_by_settlement<C: ConnectionTrait>(
    conn: &C,
    dealer_id: DealerId,
    farmer_business_id: &str,
    loan_ids: &[Uuid],
) -> AppResult<bool> {
    let rows = settlements::Entity::find()
        .filter(settlements::Column::DealerId.eq(dealer_id.into_inner()))
        .filter(settlements::Column::FarmerBusinessId.eq(farmer_business_id))
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
            .loan_payments
            .0
            .iter()
            .any(|l| loan_ids.contains(&l.loan_id))
        {
            return Ok(true);
        }
    }
    Ok(false)
}
