//! Oldest-first allocation of a lump payment across pending balances.

use rust_decimal::Decimal;
use thiserror::Error;

/// Allocation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// The offered amount exceeds the combined pending balance of the
    /// selected targets.
    #[error("Payment of {offered} exceeds total pending amount of {pending_total}")]
    Overpayment {
        /// Combined pending balance of the targets.
        pending_total: Decimal,
        /// Amount offered.
        offered: Decimal,
    },
}

impl From<PaymentError> for mandi_shared::AppError {
    fn from(err: PaymentError) -> Self {
        Self::Overpayment(err.to_string())
    }
}

/// One target's share of an allocated payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// Pending balance before allocation.
    pub pending_before: Decimal,
    /// Amount allocated to this target.
    pub paid: Decimal,
    /// Pending balance after allocation.
    pub pending_after: Decimal,
}

/// Splits `total` across `pendings` in order, paying each balance down
/// fully before the next. Callers must pass balances oldest-created
/// first; creation order is the allocation policy, not the caller's
/// selection order.
///
/// Targets past the point where `total` runs out get an untouched
/// zero-paid line.
///
/// # Errors
///
/// Returns [`PaymentError::Overpayment`] if `total` exceeds the sum of
/// `pendings`. Nothing is partially allocated on failure.
pub fn allocate(pendings: &[Decimal], total: Decimal) -> Result<Vec<Allocation>, PaymentError> {
    let pending_total: Decimal = pendings.iter().copied().sum();
    if total > pending_total {
        return Err(PaymentError::Overpayment {
            pending_total,
            offered: total,
        });
    }

    let mut remaining = total;
    let allocations = pendings
        .iter()
        .map(|&pending| {
            let paid = pending.min(remaining);
            remaining -= paid;
            Allocation {
                pending_before: pending,
                paid,
                pending_after: pending - paid,
            }
        })
        .collect();

    Ok(allocations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fifo_pays_oldest_first() {
        let allocs = allocate(&[dec!(100), dec!(50), dec!(30)], dec!(120)).unwrap();

        assert_eq!(allocs[0].paid, dec!(100));
        assert_eq!(allocs[0].pending_after, dec!(0));
        assert_eq!(allocs[1].paid, dec!(20));
        assert_eq!(allocs[1].pending_after, dec!(30));
        assert_eq!(allocs[2].paid, dec!(0));
        assert_eq!(allocs[2].pending_after, dec!(30));
    }

    #[test]
    fn test_exact_payoff_clears_everything() {
        let allocs = allocate(&[dec!(100), dec!(80)], dec!(180)).unwrap();
        assert!(allocs.iter().all(|a| a.pending_after.is_zero()));
    }

    #[test]
    fn test_overpayment_rejected() {
        let err = allocate(&[dec!(100), dec!(50), dec!(30)], dec!(181)).unwrap_err();
        assert_eq!(
            err,
            PaymentError::Overpayment {
                pending_total: dec!(180),
                offered: dec!(181),
            }
        );
    }

    #[test]
    fn test_zero_payment_touches_nothing() {
        let allocs = allocate(&[dec!(40), dec!(60)], dec!(0)).unwrap();
        assert!(allocs.iter().all(|a| a.paid.is_zero()));
        assert_eq!(allocs[1].pending_after, dec!(60));
    }

    proptest! {
        /// Every accepted allocation conserves money: the paid amounts
        /// sum to the total, and each line's books balance.
        #[test]
        fn prop_allocation_conserves_total(
            pendings in prop::collection::vec(0i64..10_000, 0..12),
            fraction in 0u32..=100,
        ) {
            let pendings: Vec<Decimal> = pendings.into_iter().map(Decimal::from).collect();
            let pending_total: Decimal = pendings.iter().copied().sum();
            let total = pending_total * Decimal::from(fraction) / Decimal::ONE_HUNDRED;

            let allocs = allocate(&pendings, total).unwrap();
            let paid_sum: Decimal = allocs.iter().map(|a| a.paid).sum();
            prop_assert_eq!(paid_sum, total);
            for a in &allocs {
                prop_assert_eq!(a.pending_before - a.paid, a.pending_after);
                prop_assert!(a.pending_after >= Decimal::ZERO);
            }
        }
    }
}
