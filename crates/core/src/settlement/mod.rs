//! Settlement netting: offsets a farmer's crop receivables against
//! their loan debt in one stroke.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who owes whom after netting crop pending against loan pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Crop pending exceeds loan pending; the dealer still owes the
    /// farmer after the loans absorb their share.
    #[serde(rename = "DEALER_TO_FARMER")]
    DealerToFarmer,
    /// Loan pending exceeds crop pending; the farmer still owes.
    #[serde(rename = "FARMER_TO_DEALER")]
    FarmerToDealer,
    /// Exact net-zero: both sides close fully.
    #[serde(rename = "SETTLED")]
    Settled,
}

impl Direction {
    /// Direction from the signed net amount (`crop pending - loan
    /// pending`).
    #[must_use]
    pub fn from_net(net: Decimal) -> Self {
        if net > Decimal::ZERO {
            Direction::DealerToFarmer
        } else if net < Decimal::ZERO {
            Direction::FarmerToDealer
        } else {
            Direction::Settled
        }
    }

    /// Stored string form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::DealerToFarmer => "DEALER_TO_FARMER",
            Direction::FarmerToDealer => "FARMER_TO_DEALER",
            Direction::Settled => "SETTLED",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEALER_TO_FARMER" => Ok(Direction::DealerToFarmer),
            "FARMER_TO_DEALER" => Ok(Direction::FarmerToDealer),
            "SETTLED" => Ok(Direction::Settled),
            other => Err(format!("unknown settlement direction: {other}")),
        }
    }
}

/// Net position of a settlement before cash changes hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Netting {
    /// Signed `crop_pending - loan_pending`.
    pub net_amount: Decimal,
    /// Direction derived from the sign of the net.
    pub direction: Direction,
    /// Cash the winning side can absorb on top of the netted value: the
    /// smaller side's pending total.
    pub absorbed: Decimal,
}

/// Nets the selected crop pending total against the selected loan
/// pending total (loan side with interest freshly accrued).
#[must_use]
pub fn net(crop_pending_total: Decimal, loan_pending_total: Decimal) -> Netting {
    let net_amount = crop_pending_total - loan_pending_total;
    Netting {
        net_amount,
        direction: Direction::from_net(net_amount),
        absorbed: crop_pending_total.min(loan_pending_total),
    }
}

/// Residual pending on the settlement record itself: whatever part of
/// the net the extra cash did not cover.
#[must_use]
pub fn residual_pending(net_amount: Decimal, extra_cash_paid: Decimal) -> Decimal {
    (net_amount.abs() - extra_cash_paid).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_dealer_owes_farmer_when_crops_exceed_loans() {
        let n = net(dec!(500), dec!(300));
        assert_eq!(n.direction, Direction::DealerToFarmer);
        assert_eq!(n.net_amount, dec!(200));
        assert_eq!(n.absorbed, dec!(300));
    }

    #[test]
    fn test_farmer_owes_dealer_when_loans_exceed_crops() {
        let n = net(dec!(300), dec!(500));
        assert_eq!(n.direction, Direction::FarmerToDealer);
        assert_eq!(n.net_amount, dec!(-200));
        assert_eq!(n.absorbed, dec!(300));
    }

    #[test]
    fn test_exact_net_zero_is_settled() {
        let n = net(dec!(400), dec!(400));
        assert_eq!(n.direction, Direction::Settled);
        assert_eq!(n.net_amount, dec!(0));
        assert_eq!(n.absorbed, dec!(400));
    }

    #[test]
    fn test_residual_pending_floors_at_zero() {
        assert_eq!(residual_pending(dec!(200), dec!(50)), dec!(150));
        assert_eq!(residual_pending(dec!(-200), dec!(50)), dec!(150));
        assert_eq!(residual_pending(dec!(200), dec!(250)), dec!(0));
    }

    #[test]
    fn test_direction_round_trips_through_strings() {
        for d in [
            Direction::DealerToFarmer,
            Direction::FarmerToDealer,
            Direction::Settled,
        ] {
            assert_eq!(d.as_str().parse::<Direction>().unwrap(), d);
        }
    }
}
