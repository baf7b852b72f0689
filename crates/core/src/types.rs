//! Domain enums shared across the ledgers.

use serde::{Deserialize, Serialize};

/// The kind of counterparty on a crop transaction.
///
/// Farmers supply crops (dealer buys, dealer pays); buyers purchase crops
/// (dealer sells, dealer receives). The kind decides which pending bucket
/// of the inventory ledger a payment moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartyKind {
    /// Supplies crops and receives loans.
    Farmer,
    /// Purchases crops.
    Buyer,
}

impl PartyKind {
    /// Wire representation used in business IDs and stored records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Farmer => "FARMER",
            Self::Buyer => "BUYER",
        }
    }
}

impl std::fmt::Display for PartyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PartyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FARMER" => Ok(Self::Farmer),
            "BUYER" => Ok(Self::Buyer),
            _ => Err(format!("Unknown party kind: {s}")),
        }
    }
}

/// How a payment moved: bank credit or cash debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMode {
    /// Bank / UPI credit.
    Credit,
    /// Cash debit.
    Debit,
}

impl PaymentMode {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
        }
    }
}

impl std::str::FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT" => Ok(Self::Credit),
            "DEBIT" => Ok(Self::Debit),
            _ => Err(format!("Unknown payment mode: {s}")),
        }
    }
}

/// Crop grades assigned at purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    /// Best quality.
    A,
    /// Good quality.
    B,
    /// Average quality.
    C,
    /// Below average.
    D,
    /// Poorest quality.
    E,
}

impl std::str::FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            "E" => Ok(Self::E),
            _ => Err(format!("Unknown grade: {s}")),
        }
    }
}

/// Crop types the ledger trades in.
pub const CROP_TYPES: [&str; 23] = [
    "MUSTARD",
    "SOYBEAN",
    "GROUNDNUT",
    "SUNFLOWER",
    "SESAME",
    "LINSEED",
    "WHEAT",
    "RICE",
    "MAIZE",
    "BARLEY",
    "JOWAR",
    "BAJRA",
    "RAGI",
    "GRAM",
    "ARHAR",
    "MOONG",
    "URAD",
    "MASOOR",
    "PEAS",
    "SUGARCANE",
    "COTTON",
    "TOBACCO",
    "JUTE",
];

/// Returns true if `name` is a recognized crop type.
#[must_use]
pub fn is_valid_crop_type(name: &str) -> bool {
    CROP_TYPES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_party_kind_round_trip() {
        assert_eq!(PartyKind::from_str("FARMER").unwrap(), PartyKind::Farmer);
        assert_eq!(PartyKind::from_str("BUYER").unwrap(), PartyKind::Buyer);
        assert_eq!(PartyKind::Farmer.as_str(), "FARMER");
        assert!(PartyKind::from_str("farmer").is_err());
    }

    #[test]
    fn test_payment_mode_round_trip() {
        assert_eq!(PaymentMode::from_str("CREDIT").unwrap(), PaymentMode::Credit);
        assert_eq!(PaymentMode::from_str("DEBIT").unwrap(), PaymentMode::Debit);
        assert!(PaymentMode::from_str("CASH").is_err());
    }

    #[test]
    fn test_crop_type_validation() {
        assert!(is_valid_crop_type("WHEAT"));
        assert!(is_valid_crop_type("JUTE"));
        assert!(!is_valid_crop_type("wheat"));
        assert!(!is_valid_crop_type("SAFFRON"));
    }

    #[test]
    fn test_grade_parse() {
        assert_eq!(Grade::from_str("A").unwrap(), Grade::A);
        assert!(Grade::from_str("F").is_err());
    }
}
