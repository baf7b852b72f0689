//! Per-crop running stock and weighted-average price ledger.
//!
//! One [`StockLedger`] exists per (dealer, crop type). Every crop
//! purchase, sale, payment, and reversal flows through it; the invariant
//! `total_in_stock == total_buy_quantity - total_sell_quantity` holds by
//! construction after every operation.

pub mod error;
pub mod ledger;

pub use error::InventoryError;
pub use ledger::{Charges, InventorySnapshot, StockLedger};
