//! Loan repository: disbursal and deletion, each folded into the
//! per-dealer summary in the same transaction.

use mandi_shared::types::{business_id, DealerId, Scope};
use mandi_shared::{AppError, AppResult};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{db_err, farmer, loan_summary, now, CounterRepository};
use crate::entities::sea_orm_active_enums;
use crate::entities::snapshots::SummaryTrail;
use crate::entities::loans;

/// Input for issuing a loan to a farmer.
#[derive(Debug, Clone)]
pub struct CreateLoanInput {
    /// The borrowing farmer's business ID (`FM-n`).
    pub farmer_business_id: String,
    /// Principal disbursed.
    pub loan_amount: Decimal,
    /// Annual interest rate in percent.
    pub interest_rate: Decimal,
    /// Free-form note on the loan's purpose.
    pub remark: String,
}

/// Loan repository.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    db: DatabaseConnection,
}

impl LoanRepository {
    /// Creates a new loan repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Issues a loan: folds it into the dealer's summary, mints the
    /// loan's business ID, and inserts the loan row, atomically.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-positive amount or rate, or an
    /// empty remark, and `NotFound` for an unknown farmer.
    pub async fn create_loan(
        &self,
        dealer_id: DealerId,
        input: CreateLoanInput,
    ) -> AppResult<loans::Model> {
        if input.loan_amount <= Decimal::ZERO || input.interest_rate <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Loan amount and interest rate must be positive".into(),
            ));
        }
        if input.remark.trim().is_empty() {
            return Err(AppError::Validation("Remark is required".into()));
        }

        let txn = self.db.begin().await.map_err(db_err)?;

        let borrower = farmer::find(&txn, dealer_id, &input.farmer_business_id).await?;

        let existing = loan_summary::fetch(&txn, dealer_id).await?;
        let mut summary = existing.as_ref().map(|m| m.to_ledger()).unwrap_or_default();
        summary.record_loan(input.loan_amount, input.interest_rate);
        loan_summary::persist(&txn, existing, &summary, dealer_id).await?;

        let seq = CounterRepository::next_sequence(
            &txn,
            &Scope::Loan {
                dealer: dealer_id,
                farmer: &input.farmer_business_id,
            }
            .key(),
        )
        .await
        .map_err(db_err)?;

        let ts = now();
        let loan = loans::ActiveModel {
            id: Set(Uuid::now_v7()),
            dealer_id: Set(dealer_id.into_inner()),
            loan_id: Set(business_id::loan_id(&input.farmer_business_id, seq)),
            farmer_ref_id: Set(borrower.id),
            farmer_business_id: Set(input.farmer_business_id),
            person_name: Set(borrower.name),
            loan_amount: Set(input.loan_amount),
            interest_rate: Set(input.interest_rate),
            period_in_days: Set(0),
            interest_amount: Set(Decimal::ZERO),
            paid_amount: Set(Decimal::ZERO),
            pending_amount: Set(input.loan_amount),
            remark: Set(input.remark),
            status: Set(sea_orm_active_enums::LoanStatus::Ongoing),
            summary: Set(SummaryTrail(vec![summary.snapshot()])),
            created_at: Set(ts),
            updated_at: Set(ts),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        tracing::info!(loan_id = %loan.loan_id, "loan issued");
        Ok(loan)
    }

    /// Deletes an untouched loan and folds it back out of the summary.
    /// The average rate is recomputed over the surviving loans.
    ///
    /// # Errors
    ///
    /// Returns `PaymentAlreadyStarted` once the loan has any repayment
    /// or accrued interest.
    pub async fn delete_loan(&self, dealer_id: DealerId, loan_business_id: &str) -> AppResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let loan = find(&txn, dealer_id, loan_business_id).await?;

        if loan.paid_amount > Decimal::ZERO
            || loan.interest_amount > Decimal::ZERO
            || loan.status != sea_orm_active_enums::LoanStatus::Ongoing
        {
            return Err(AppError::PaymentAlreadyStarted(format!(
                "Loan {loan_business_id} already has payments or interest"
            )));
        }

        let existing = loan_summary::fetch(&txn, dealer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Loan summary".into()))?;
        let mut summary = existing.to_ledger();

        let remaining_rates: Vec<Decimal> = loans::Entity::find()
            .select_only()
            .column(loans::Column::InterestRate)
            .filter(loans::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(loans::Column::Id.ne(loan.id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(db_err)?;

        summary.remove_loan(loan.loan_amount, &remaining_rates);
        loan_summary::persist(&txn, Some(existing), &summary, dealer_id).await?;

        loan.delete(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    /// Finds a loan by business ID within the dealer's tenancy.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent or owned by another dealer.
    pub async fn find_by_business_id(
        &self,
        dealer_id: DealerId,
        loan_business_id: &str,
    ) -> AppResult<loans::Model> {
        find(&self.db, dealer_id, loan_business_id).await
    }

    /// Lists a farmer's loans, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_farmer(
        &self,
        dealer_id: DealerId,
        farmer_business_id: &str,
    ) -> AppResult<Vec<loans::Model>> {
        loans::Entity::find()
            .filter(loans::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(loans::Column::FarmerBusinessId.eq(farmer_business_id))
            .order_by_desc(loans::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists a farmer's loans that still carry an outstanding balance,
    /// oldest first (the payment engine's allocation order).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_pending_for_farmer(
        &self,
        dealer_id: DealerId,
        farmer_business_id: &str,
    ) -> AppResult<Vec<loans::Model>> {
        loans::Entity::find()
            .filter(loans::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(loans::Column::FarmerBusinessId.eq(farmer_business_id))
            .filter(loans::Column::PendingAmount.gt(Decimal::ZERO))
            .order_by_asc(loans::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists the business IDs of farmers who still owe on any loan.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_borrower_ids(&self, dealer_id: DealerId) -> AppResult<Vec<String>> {
        loans::Entity::find()
            .select_only()
            .column(loans::Column::FarmerBusinessId)
            .distinct()
            .filter(loans::Column::DealerId.eq(dealer_id.into_inner()))
            .filter(loans::Column::PendingAmount.gt(Decimal::ZERO))
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}

/// Loan lookup on the caller's connection or transaction.
pub(crate) async fn find<C: ConnectionTrait>(
    conn: &C,
    dealer_id: DealerId,
    loan_business_id: &str,
) -> AppResult<loans::Model> {
    loans::Entity::find()
        .filter(loans::Column::DealerId.eq(dealer_id.into_inner()))
        .filter(loans::Column::LoanId.eq(loan_business_id))
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::NotFound(format!("Loan {loan_business_id}")))
}

/// Loads the outstanding loans among `ids`, oldest first, verifying
/// tenancy.
pub(crate) async fn load_pending_by_ids<C: ConnectionTrait>(
    conn: &C,
    dealer_id: DealerId,
    ids: &[Uuid],
) -> AppResult<Vec<loans::Model>> {
    loans::Entity::find()
        .filter(loans::Column::DealerId.eq(dealer_id.into_inner()))
        .filter(loans::Column::Id.is_in(ids.iter().copied()))
        .filter(loans::Column::PendingAmount.gt(Decimal::ZERO))
        .order_by_asc(loans::Column::CreatedAt)
        .all(conn)
        .await
        .map_err(db_err)
}
