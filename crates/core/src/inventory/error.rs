//! Inventory ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by [`super::StockLedger`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// The supplied gunny capacity differs from the one fixed by the
    /// first purchase of this crop type.
    #[error("Gunny capacity mismatch. Existing: {existing} KG")]
    ConfigurationMismatch {
        /// Capacity fixed by the first farmer purchase.
        existing: Decimal,
        /// Capacity supplied by the caller.
        supplied: Decimal,
    },

    /// Sale quantity exceeds stock on hand.
    #[error("Not enough stock. Available: {available} Qt")]
    InsufficientStock {
        /// Quantity currently in stock.
        available: Decimal,
        /// Quantity requested for sale.
        requested: Decimal,
    },
}

impl From<InventoryError> for mandi_shared::AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::ConfigurationMismatch { .. } => {
                Self::ConfigurationMismatch(err.to_string())
            }
            InventoryError::InsufficientStock { .. } => Self::InsufficientStock(err.to_string()),
        }
    }
}
