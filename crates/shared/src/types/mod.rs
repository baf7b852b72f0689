//! Common type definitions.

pub mod business_id;
pub mod id;

pub use business_id::Scope;
pub use id::{
    BuyerId, CropId, CropPaymentId, DealerId, FarmerId, InventoryId, LoanId, LoanPaymentId,
    SettlementId,
};
