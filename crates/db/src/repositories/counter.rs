//! Dealer-scoped business-ID sequences.

use sea_orm::{ConnectionTrait, DbBackend, DbErr, Statement};

/// Atomic increment-and-return over the counters table.
///
/// Stateless; operations take whatever connection or transaction the
/// caller is already inside, so a rolled-back unit of work also rolls
/// back its sequence draw.
#[derive(Debug, Clone, Copy)]
pub struct CounterRepository;

impl CounterRepository {
    /// Returns the next sequence number for `key`, creating the counter
    /// at 1 on first use. Never returns the same value twice for one
    /// key (the upsert is atomic under any isolation level).
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn next_sequence<C: ConnectionTrait>(conn: &C, key: &str) -> Result<i64, DbErr> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO counters (id, seq) VALUES ($1, 1) \
             ON CONFLICT (id) DO UPDATE SET seq = counters.seq + 1 \
             RETURNING seq",
            [key.into()],
        );

        let row = conn
            .query_one(stmt)
            .await?
            .ok_or_else(|| DbErr::Custom("counter upsert returned no row".into()))?;

        row.try_get("", "seq")
    }
}
