//! JSON-embedded audit trails.
//!
//! Payment and settlement records carry full before/after allocation
//! lines plus a snapshot of the owning aggregate at the moment of the
//! transaction. These are denormalized on purpose: a reversal restores
//! the target from the stored `pending_before`, never from a formula,
//! and the snapshot survives even after the aggregate row moves on.

use mandi_core::inventory::InventorySnapshot;
use mandi_core::loan::SummarySnapshot;
use rust_decimal::Decimal;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inventory snapshots stored on a crop row (one per save that touched
/// the crop).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct InventoryTrail(pub Vec<InventorySnapshot>);

/// Loan-summary snapshots stored on a loan row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SummaryTrail(pub Vec<SummarySnapshot>);

/// One crop's share of a payment or settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropAllocationLine {
    /// Row ID of the crop paid against.
    pub crop_id: Uuid,
    /// Business ID of the crop (`CR-...`).
    pub crop_business_id: String,
    /// Crop type.
    pub crop_type: String,
    /// Crop quantity in quintals.
    pub quantity: Decimal,
    /// Agreed price per quintal.
    pub price_per_quintal: Decimal,
    /// Full value of the crop.
    pub total_amount: Decimal,
    /// Pending balance before this allocation.
    pub pending_before: Decimal,
    /// Amount allocated to this crop (negative on reversal lines).
    pub paid_amount: Decimal,
    /// Pending balance after this allocation.
    pub pending_after: Decimal,
    /// Crop status after this allocation (`DONE`, `PARTIAL-DONE`, or
    /// `REVERSED` on reversal lines).
    pub status_after: String,
    /// Inventory snapshot taken right after the allocation.
    pub inventory: Vec<InventorySnapshot>,
}

/// One loan's share of a payment or settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanAllocationLine {
    /// Row ID of the loan paid against.
    pub loan_id: Uuid,
    /// Business ID of the loan (`LN-...`).
    pub loan_business_id: String,
    /// Original principal.
    pub loan_amount: Decimal,
    /// Principal outstanding before this allocation.
    pub principal_pending_before: Decimal,
    /// Annual interest rate in percent.
    pub interest_rate: Decimal,
    /// Days the accrued interest covers.
    pub period_in_days: i64,
    /// Interest accrued by this allocation.
    pub interest_amount: Decimal,
    /// Principal plus interest before this allocation.
    pub total_payable_before: Decimal,
    /// Amount allocated to this loan (negative on reversal lines).
    pub paid_amount: Decimal,
    /// Outstanding balance after this allocation.
    pub pending_amount_after: Decimal,
    /// Loan status after this allocation (`FINISHED`,
    /// `PARTIAL-FINISHED`, or `REVERSED` on reversal lines).
    pub loan_status_after: String,
    /// Loan-summary snapshot taken right after the allocation.
    pub summary: Vec<SummarySnapshot>,
}

/// Crop allocation lines stored on a payment or settlement row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct CropAllocations(pub Vec<CropAllocationLine>);

/// Loan allocation lines stored on a payment or settlement row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct LoanAllocations(pub Vec<LoanAllocationLine>);

/// Status literal stored on reversal allocation lines.
pub const STATUS_REVERSED: &str = "REVERSED";
