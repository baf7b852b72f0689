//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `FarmerId` where a
//! `LoanId` is expected. These are storage identities; the human-readable
//! dealer-scoped identifiers live in [`crate::types::business_id`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(DealerId, "Unique identifier for a dealer (tenant root).");
typed_id!(FarmerId, "Unique identifier for a farmer.");
typed_id!(BuyerId, "Unique identifier for a buyer.");
typed_id!(CropId, "Unique identifier for a crop transaction.");
typed_id!(InventoryId, "Unique identifier for an inventory row.");
typed_id!(LoanId, "Unique identifier for a loan.");
typed_id!(CropPaymentId, "Unique identifier for a crop payment record.");
typed_id!(LoanPaymentId, "Unique identifier for a loan payment record.");
typed_id!(SettlementId, "Unique identifier for a settlement record.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_ids_are_distinct_types() {
        let dealer = DealerId::new();
        let farmer = FarmerId::from_uuid(dealer.into_inner());
        // Same underlying UUID, but different types; only values compare.
        assert_eq!(dealer.into_inner(), farmer.into_inner());
    }

    #[test]
    fn test_round_trip_display_parse() {
        let id = CropId::new();
        let parsed = CropId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_v7_ids_are_time_ordered() {
        let a = LoanId::new();
        let b = LoanId::new();
        assert!(a.into_inner() <= b.into_inner());
    }
}
