//! Loan summary repository: the per-dealer running loan aggregate.

use mandi_core::loan::SummaryLedger;
use mandi_shared::types::DealerId;
use mandi_shared::AppResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use super::{db_err, now};
use crate::entities::loan_summaries;

/// Read access to the per-dealer loan summary.
#[derive(Debug, Clone)]
pub struct LoanSummaryRepository {
    db: DatabaseConnection,
}

impl LoanSummaryRepository {
    /// Creates a new loan summary repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the dealer's summary, or an all-zero ledger for a dealer
    /// who has never issued a loan.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get(&self, dealer_id: DealerId) -> AppResult<SummaryLedger> {
        let row = fetch(&self.db, dealer_id).await?;
        Ok(row.map(|m| m.to_ledger()).unwrap_or_default())
    }
}

/// Loads the summary row on the caller's connection or transaction.
pub(crate) async fn fetch<C: ConnectionTrait>(
    conn: &C,
    dealer_id: DealerId,
) -> AppResult<Option<loan_summaries::Model>> {
    loan_summaries::Entity::find()
        .filter(loan_summaries::Column::DealerId.eq(dealer_id.into_inner()))
        .one(conn)
        .await
        .map_err(db_err)
}

/// Writes a summary ledger back, creating the row lazily on the first
/// loan.
pub(crate) async fn persist<C: ConnectionTrait>(
    conn: &C,
    existing: Option<loan_summaries::Model>,
    ledger: &SummaryLedger,
    dealer_id: DealerId,
) -> AppResult<()> {
    let ts = now();

    let is_insert = existing.is_none();
    let mut active = match existing {
        Some(model) => {
            let mut active: loan_summaries::ActiveModel = model.into();
            active.updated_at = Set(ts);
            active
        }
        None => loan_summaries::ActiveModel {
            id: Set(Uuid::now_v7()),
            dealer_id: Set(dealer_id.into_inner()),
            created_at: Set(ts),
            updated_at: Set(ts),
            ..Default::default()
        },
    };

    active.total_loan_given = Set(ledger.total_loan_given);
    active.total_interest_accrued = Set(ledger.total_interest_accrued);
    active.total_payable_amount = Set(ledger.total_payable_amount);
    active.total_paid_amount = Set(ledger.total_paid_amount);
    active.total_pending_amount = Set(ledger.total_pending_amount);
    active.average_interest_rate = Set(ledger.average_interest_rate);
    active.total_loans = Set(i32::try_from(ledger.total_loans).unwrap_or(i32::MAX));
    active.ongoing_loans = Set(i32::try_from(ledger.ongoing_loans).unwrap_or(i32::MAX));
    active.finished_loans = Set(i32::try_from(ledger.finished_loans).unwrap_or(i32::MAX));
    active.last_updated_at = Set(ts);

    if is_insert {
        active.insert(conn).await.map_err(db_err)?;
    } else {
        active.update(conn).await.map_err(db_err)?;
    }
    Ok(())
}
