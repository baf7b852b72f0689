//! Derived payment and loan state machines.
//!
//! Statuses are never stored independently of the numbers they summarize:
//! every save derives them from the paid/pending pair through these two
//! functions, so the derivation cannot drift between call sites.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment progress of a crop transaction or payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Nothing paid yet.
    #[serde(rename = "NOT-DONE")]
    NotDone,
    /// Partially paid.
    #[serde(rename = "PARTIAL-DONE")]
    PartialDone,
    /// Fully paid.
    #[serde(rename = "DONE")]
    Done,
}

impl PaymentStatus {
    /// Derives the status from the paid/pending pair.
    #[must_use]
    pub fn derive(paid: Decimal, pending: Decimal) -> Self {
        if paid.is_zero() {
            Self::NotDone
        } else if pending.is_zero() {
            Self::Done
        } else {
            Self::PartialDone
        }
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotDone => "NOT-DONE",
            Self::PartialDone => "PARTIAL-DONE",
            Self::Done => "DONE",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT-DONE" => Ok(Self::NotDone),
            "PARTIAL-DONE" => Ok(Self::PartialDone),
            "DONE" => Ok(Self::Done),
            _ => Err(format!("Unknown payment status: {s}")),
        }
    }
}

/// Repayment progress of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// Untouched: no repayment applied yet.
    #[serde(rename = "ONGOING")]
    Ongoing,
    /// Partially repaid.
    #[serde(rename = "PARTIAL-FINISHED")]
    PartialFinished,
    /// Principal and accrued interest fully repaid.
    #[serde(rename = "FINISHED")]
    Finished,
}

impl LoanStatus {
    /// Derives the status from the paid/pending pair.
    #[must_use]
    pub fn derive(paid: Decimal, pending: Decimal) -> Self {
        if paid.is_zero() {
            Self::Ongoing
        } else if pending.is_zero() {
            Self::Finished
        } else {
            Self::PartialFinished
        }
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ongoing => "ONGOING",
            Self::PartialFinished => "PARTIAL-FINISHED",
            Self::Finished => "FINISHED",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONGOING" => Ok(Self::Ongoing),
            "PARTIAL-FINISHED" => Ok(Self::PartialFinished),
            "FINISHED" => Ok(Self::Finished),
            _ => Err(format!("Unknown loan status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_status_derivation_table() {
        assert_eq!(
            PaymentStatus::derive(dec!(0), dec!(500)),
            PaymentStatus::NotDone
        );
        assert_eq!(
            PaymentStatus::derive(dec!(200), dec!(300)),
            PaymentStatus::PartialDone
        );
        assert_eq!(
            PaymentStatus::derive(dec!(500), dec!(0)),
            PaymentStatus::Done
        );
        // Zero-total record: nothing paid, nothing pending.
        assert_eq!(
            PaymentStatus::derive(dec!(0), dec!(0)),
            PaymentStatus::NotDone
        );
    }

    #[test]
    fn test_loan_status_derivation_table() {
        assert_eq!(LoanStatus::derive(dec!(0), dec!(1000)), LoanStatus::Ongoing);
        assert_eq!(
            LoanStatus::derive(dec!(400), dec!(600)),
            LoanStatus::PartialFinished
        );
        assert_eq!(LoanStatus::derive(dec!(1000), dec!(0)), LoanStatus::Finished);
        // Fully reversed loan returns to ONGOING, not PARTIAL-FINISHED.
        assert_eq!(LoanStatus::derive(dec!(0), dec!(0)), LoanStatus::Ongoing);
    }

    #[test]
    fn test_wire_strings_round_trip() {
        use std::str::FromStr;
        for status in [
            PaymentStatus::NotDone,
            PaymentStatus::PartialDone,
            PaymentStatus::Done,
        ] {
            assert_eq!(PaymentStatus::from_str(status.as_str()).unwrap(), status);
        }
        for status in [
            LoanStatus::Ongoing,
            LoanStatus::PartialFinished,
            LoanStatus::Finished,
        ] {
            assert_eq!(LoanStatus::from_str(status.as_str()).unwrap(), status);
        }
    }
}
