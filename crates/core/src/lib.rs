//! Core business logic for Mandi.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All ledger arithmetic, status derivation, and allocation
//! policy live here; the `mandi-db` crate wraps these in atomic units of
//! work.
//!
//! # Modules
//!
//! - `inventory` - Per-crop running stock and weighted-average price ledger
//! - `loan` - Interest accrual and the per-dealer loan summary ledger
//! - `payment` - FIFO allocation of lump payments across pending records
//! - `settlement` - Netting crop receivables against loan payables
//! - `status` - Derived payment/loan state machines
//! - `types` - Domain enums shared across the ledgers

pub mod inventory;
pub mod loan;
pub mod payment;
pub mod settlement;
pub mod status;
pub mod types;
