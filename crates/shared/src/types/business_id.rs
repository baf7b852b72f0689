//! Dealer-scoped business identifiers.
//!
//! Every entity carries a human-readable sequential ID (`FM-12`,
//! `CR-FM-3-WHEAT-2`, ...) minted from an atomic per-scope counter. The
//! scope key decides which sequence a mint draws from; two entities minted
//! from the same scope never share a number.

use super::id::DealerId;

/// A counter scope. Builds the composite key the counter store increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// Farmer registration, one sequence per dealer.
    Farmer(DealerId),
    /// Buyer registration, one sequence per dealer.
    Buyer(DealerId),
    /// Crop transactions, scoped per (dealer, party kind, party, crop type).
    Crop {
        /// Owning dealer.
        dealer: DealerId,
        /// `FARMER` or `BUYER`.
        party_kind: &'a str,
        /// The party's business ID.
        party: &'a str,
        /// Crop type name.
        crop_type: &'a str,
    },
    /// Loans, scoped per (dealer, farmer).
    Loan {
        /// Owning dealer.
        dealer: DealerId,
        /// The farmer's business ID.
        farmer: &'a str,
    },
    /// Payments (crop and loan share one sequence per party).
    Payment {
        /// Owning dealer.
        dealer: DealerId,
        /// The party's business ID.
        party: &'a str,
    },
    /// Payment reversals, a separate sequence from payments.
    PaymentReversal {
        /// Owning dealer.
        dealer: DealerId,
        /// The party's business ID.
        party: &'a str,
    },
    /// Settlements, scoped per (dealer, farmer).
    Settlement {
        /// Owning dealer.
        dealer: DealerId,
        /// The farmer's business ID.
        farmer: &'a str,
    },
    /// Settlement reversals, a separate sequence from settlements.
    SettlementReversal {
        /// Owning dealer.
        dealer: DealerId,
        /// The farmer's business ID.
        farmer: &'a str,
    },
}

impl Scope<'_> {
    /// Returns the composite counter key for this scope.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Farmer(dealer) => format!("farmerId-{dealer}"),
            Self::Buyer(dealer) => format!("buyerId-{dealer}"),
            Self::Crop {
                dealer,
                party_kind,
                party,
                crop_type,
            } => format!("CROP-{dealer}-{party_kind}-{party}-{crop_type}"),
            Self::Loan { dealer, farmer } => format!("LOAN-{dealer}-{farmer}"),
            Self::Payment { dealer, party } => format!("PAY-{dealer}-{party}"),
            Self::PaymentReversal { dealer, party } => format!("REV-{dealer}-{party}"),
            Self::Settlement { dealer, farmer } => format!("SETL-{dealer}-{farmer}"),
            Self::SettlementReversal { dealer, farmer } => {
                format!("REV-SETL-{dealer}-{farmer}")
            }
        }
    }
}

/// Mints a farmer business ID (`FM-{n}`).
#[must_use]
pub fn farmer_id(seq: i64) -> String {
    format!("FM-{seq}")
}

/// Mints a buyer business ID (`BR-{n}`).
#[must_use]
pub fn buyer_id(seq: i64) -> String {
    format!("BR-{seq}")
}

/// Mints a crop business ID (`CR-{party}-{cropType}-{n}`).
#[must_use]
pub fn crop_id(party: &str, crop_type: &str, seq: i64) -> String {
    format!("CR-{party}-{crop_type}-{seq}")
}

/// Mints a loan business ID (`LN-{farmer}-{n}`).
#[must_use]
pub fn loan_id(farmer: &str, seq: i64) -> String {
    format!("LN-{farmer}-{seq}")
}

/// Mints a crop payment ID (`PAY-{party}-CR-{n}`).
#[must_use]
pub fn crop_payment_id(party: &str, seq: i64) -> String {
    format!("PAY-{party}-CR-{seq}")
}

/// Mints a crop payment reversal ID (`REV-{party}-CR-{n}`).
#[must_use]
pub fn crop_payment_reversal_id(party: &str, seq: i64) -> String {
    format!("REV-{party}-CR-{seq}")
}

/// Mints a loan payment ID (`PAY-{farmer}-LN-{n}`).
#[must_use]
pub fn loan_payment_id(farmer: &str, seq: i64) -> String {
    format!("PAY-{farmer}-LN-{seq}")
}

/// Mints a loan payment reversal ID (`REV-{farmer}-LN-{n}`).
#[must_use]
pub fn loan_payment_reversal_id(farmer: &str, seq: i64) -> String {
    format!("REV-{farmer}-LN-{seq}")
}

/// Mints a settlement ID (`SETL-{farmer}-{n}`).
#[must_use]
pub fn settlement_id(farmer: &str, seq: i64) -> String {
    format!("SETL-{farmer}-{seq}")
}

/// Mints a settlement reversal ID (`REV-SETL-{farmer}-{n}`).
#[must_use]
pub fn settlement_reversal_id(farmer: &str, seq: i64) -> String {
    format!("REV-SETL-{farmer}-{seq}")
}

/// Mints an inventory row ID (`CR-{CROPTYPE}`). Not sequence-backed.
#[must_use]
pub fn inventory_id(crop_type: &str) -> String {
    format!("CR-{}", crop_type.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dealer() -> DealerId {
        DealerId::from_uuid(uuid::Uuid::nil())
    }

    #[test]
    fn test_scope_keys_are_distinct_per_kind() {
        let d = dealer();
        let farmer = Scope::Farmer(d).key();
        let buyer = Scope::Buyer(d).key();
        assert_ne!(farmer, buyer);
        assert!(farmer.starts_with("farmerId-"));
        assert!(buyer.starts_with("buyerId-"));
    }

    #[test]
    fn test_payment_and_reversal_scopes_differ() {
        let d = dealer();
        let pay = Scope::Payment {
            dealer: d,
            party: "FM-1",
        };
        let rev = Scope::PaymentReversal {
            dealer: d,
            party: "FM-1",
        };
        assert_ne!(pay.key(), rev.key());
    }

    #[test]
    fn test_crop_scope_includes_party_and_crop_type() {
        let key = Scope::Crop {
            dealer: dealer(),
            party_kind: "FARMER",
            party: "FM-3",
            crop_type: "WHEAT",
        }
        .key();
        assert!(key.contains("FARMER"));
        assert!(key.contains("FM-3"));
        assert!(key.ends_with("WHEAT"));
    }

    #[test]
    fn test_mint_formats() {
        assert_eq!(farmer_id(12), "FM-12");
        assert_eq!(buyer_id(4), "BR-4");
        assert_eq!(crop_id("FM-3", "WHEAT", 2), "CR-FM-3-WHEAT-2");
        assert_eq!(loan_id("FM-3", 7), "LN-FM-3-7");
        assert_eq!(crop_payment_id("FM-3", 1), "PAY-FM-3-CR-1");
        assert_eq!(crop_payment_reversal_id("FM-3", 1), "REV-FM-3-CR-1");
        assert_eq!(loan_payment_id("FM-3", 5), "PAY-FM-3-LN-5");
        assert_eq!(loan_payment_reversal_id("FM-3", 5), "REV-FM-3-LN-5");
        assert_eq!(settlement_id("FM-3", 1), "SETL-FM-3-1");
        assert_eq!(settlement_reversal_id("FM-3", 1), "REV-SETL-FM-3-1");
        assert_eq!(inventory_id("wheat"), "CR-WHEAT");
    }
}
