//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the dealer ledgers
//! - Repository abstractions wrapping each ledger mutation in one
//!   atomic transaction
//! - Database migrations
//!
//! Every repository query is scoped by `dealer_id`; a row owned by
//! another dealer is indistinguishable from a missing row.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    BuyerRepository, CropPaymentRepository, CropRepository, FarmerRepository, InventoryRepository,
    LoanPaymentRepository, LoanRepository, LoanSummaryRepository, SettlementRepository,
};

use mandi_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection using the application configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections);
    Database::connect(options).await
}
