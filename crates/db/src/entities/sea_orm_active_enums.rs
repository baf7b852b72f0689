//! Active enums backing the Postgres enum types.
//!
//! Stored string values use the hyphenated historical spellings
//! (`NOT-DONE`, `PARTIAL-FINISHED`); conversions to and from the
//! `mandi-core` enums go through those strings' semantics, never by
//! position.

use mandi_core::settlement::Direction;
use mandi_core::status;
use mandi_core::types;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Crop-side payment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
pub enum PaymentStatus {
    /// Nothing paid yet.
    #[sea_orm(string_value = "NOT-DONE")]
    NotDone,
    /// Partly paid.
    #[sea_orm(string_value = "PARTIAL-DONE")]
    PartialDone,
    /// Fully paid.
    #[sea_orm(string_value = "DONE")]
    Done,
}

/// Loan repayment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "loan_status")]
pub enum LoanStatus {
    /// Nothing repaid yet.
    #[sea_orm(string_value = "ONGOING")]
    Ongoing,
    /// Partly repaid.
    #[sea_orm(string_value = "PARTIAL-FINISHED")]
    PartialFinished,
    /// Fully repaid.
    #[sea_orm(string_value = "FINISHED")]
    Finished,
}

/// Counterparty side of a crop transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "party_kind")]
pub enum PartyKind {
    /// A farmer selling produce to the dealer.
    #[sea_orm(string_value = "FARMER")]
    Farmer,
    /// A buyer purchasing stock from the dealer.
    #[sea_orm(string_value = "BUYER")]
    Buyer,
}

/// How a payment moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_mode")]
pub enum PaymentMode {
    /// Bank or ledger credit.
    #[sea_orm(string_value = "CREDIT")]
    Credit,
    /// Cash or direct debit.
    #[sea_orm(string_value = "DEBIT")]
    Debit,
}

/// Who owes whom after a settlement nets crops against loans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "settlement_direction"
)]
pub enum SettlementDirection {
    /// Dealer still owes the farmer.
    #[sea_orm(string_value = "DEALER_TO_FARMER")]
    DealerToFarmer,
    /// Farmer still owes the dealer.
    #[sea_orm(string_value = "FARMER_TO_DEALER")]
    FarmerToDealer,
    /// Exact net-zero.
    #[sea_orm(string_value = "SETTLED")]
    Settled,
}

/// Crop quality grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "crop_grade")]
pub enum CropGrade {
    /// Grade A.
    #[sea_orm(string_value = "A")]
    A,
    /// Grade B.
    #[sea_orm(string_value = "B")]
    B,
    /// Grade C.
    #[sea_orm(string_value = "C")]
    C,
    /// Grade D.
    #[sea_orm(string_value = "D")]
    D,
    /// Grade E.
    #[sea_orm(string_value = "E")]
    E,
}

impl From<status::PaymentStatus> for PaymentStatus {
    fn from(s: status::PaymentStatus) -> Self {
        match s {
            status::PaymentStatus::NotDone => Self::NotDone,
            status::PaymentStatus::PartialDone => Self::PartialDone,
            status::PaymentStatus::Done => Self::Done,
        }
    }
}

impl From<PaymentStatus> for status::PaymentStatus {
    fn from(s: PaymentStatus) -> Self {
        match s {
            PaymentStatus::NotDone => Self::NotDone,
            PaymentStatus::PartialDone => Self::PartialDone,
            PaymentStatus::Done => Self::Done,
        }
    }
}

impl From<status::LoanStatus> for LoanStatus {
    fn from(s: status::LoanStatus) -> Self {
        match s {
            status::LoanStatus::Ongoing => Self::Ongoing,
            status::LoanStatus::PartialFinished => Self::PartialFinished,
            status::LoanStatus::Finished => Self::Finished,
        }
    }
}

impl From<LoanStatus> for status::LoanStatus {
    fn from(s: LoanStatus) -> Self {
        match s {
            LoanStatus::Ongoing => Self::Ongoing,
            LoanStatus::PartialFinished => Self::PartialFinished,
            LoanStatus::Finished => Self::Finished,
        }
    }
}

impl From<types::PartyKind> for PartyKind {
    fn from(p: types::PartyKind) -> Self {
        match p {
            types::PartyKind::Farmer => Self::Farmer,
            types::PartyKind::Buyer => Self::Buyer,
        }
    }
}

impl From<PartyKind> for types::PartyKind {
    fn from(p: PartyKind) -> Self {
        match p {
            PartyKind::Farmer => Self::Farmer,
            PartyKind::Buyer => Self::Buyer,
        }
    }
}

impl From<types::PaymentMode> for PaymentMode {
    fn from(m: types::PaymentMode) -> Self {
        match m {
            types::PaymentMode::Credit => Self::Credit,
            types::PaymentMode::Debit => Self::Debit,
        }
    }
}

impl From<types::Grade> for CropGrade {
    fn from(g: types::Grade) -> Self {
        match g {
            types::Grade::A => Self::A,
            types::Grade::B => Self::B,
            types::Grade::C => Self::C,
            types::Grade::D => Self::D,
            types::Grade::E => Self::E,
        }
    }
}

impl From<Direction> for SettlementDirection {
    fn from(d: Direction) -> Self {
        match d {
            Direction::DealerToFarmer => Self::DealerToFarmer,
            Direction::FarmerToDealer => Self::FarmerToDealer,
            Direction::Settled => Self::Settled,
        }
    }
}

impl From<SettlementDirection> for Direction {
    fn from(d: SettlementDirection) -> Self {
        match d {
            SettlementDirection::DealerToFarmer => Self::DealerToFarmer,
            SettlementDirection::FarmerToDealer => Self::FarmerToDealer,
            SettlementDirection::Settled => Self::Settled,
        }
    }
}
