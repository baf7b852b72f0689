//! Per-dealer running loan totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Running aggregate over every loan a dealer has issued. One row per
/// dealer, created lazily on the first loan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLedger {
    /// Total principal disbursed.
    pub total_loan_given: Decimal,
    /// Total interest accrued across all loans.
    pub total_interest_accrued: Decimal,
    /// Principal plus accrued interest.
    pub total_payable_amount: Decimal,
    /// Total repaid.
    pub total_paid_amount: Decimal,
    /// Total outstanding.
    pub total_pending_amount: Decimal,
    /// Count-weighted average interest rate across loans.
    pub average_interest_rate: Decimal,
    /// Loans ever issued (less deletions).
    pub total_loans: u32,
    /// Loans not yet fully repaid.
    pub ongoing_loans: u32,
    /// Loans fully repaid.
    pub finished_loans: u32,
}

/// Point-in-time copy of the summary, embedded on loan and payment
/// records as the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySnapshot {
    /// Total principal disbursed.
    pub total_loan: Decimal,
    /// Average interest rate.
    pub average_interest: Decimal,
    /// Total interest accrued.
    pub total_interest: Decimal,
    /// Total payable.
    pub total_amount: Decimal,
    /// Total repaid.
    pub total_paid: Decimal,
    /// Total outstanding.
    pub total_pending: Decimal,
}

impl SummaryLedger {
    /// Folds a newly issued loan into the totals. The average rate moves
    /// by loan count, not by principal weight.
    pub fn record_loan(&mut self, principal: Decimal, rate: Decimal) {
        self.total_loan_given += principal;
        self.total_payable_amount += principal;
        self.total_pending_amount += principal;

        self.total_loans += 1;
        self.ongoing_loans += 1;

        let n = Decimal::from(self.total_loans);
        self.average_interest_rate = (self.average_interest_rate * (n - Decimal::ONE) + rate) / n;
    }

    /// Removes an untouched loan (delete path). The average rate is
    /// recomputed as a plain mean over the surviving loans' rates.
    pub fn remove_loan(&mut self, principal: Decimal, remaining_rates: &[Decimal]) {
        self.total_loan_given -= principal;
        self.total_payable_amount -= principal;
        self.total_pending_amount -= principal;

        self.total_loans = self.total_loans.saturating_sub(1);
        self.ongoing_loans = self.ongoing_loans.saturating_sub(1);

        self.average_interest_rate = if remaining_rates.is_empty() {
            Decimal::ZERO
        } else {
            remaining_rates.iter().copied().sum::<Decimal>() / Decimal::from(remaining_rates.len() as u64)
        };
    }

    /// Folds one allocation line of a loan payment into the totals. The
    /// interest accrued by the payment grows the payable side; pending
    /// is clamped at zero against rounding drift.
    pub fn record_payment(&mut self, paid: Decimal, interest: Decimal) {
        self.total_paid_amount += paid;
        self.total_pending_amount += interest - paid;
        if self.total_pending_amount < Decimal::ZERO {
            self.total_pending_amount = Decimal::ZERO;
        }
        self.total_interest_accrued += interest;
        self.total_payable_amount += interest;
    }

    /// Undoes one allocation line previously folded in with
    /// [`Self::record_payment`].
    pub fn reverse_payment(&mut self, paid: Decimal, interest: Decimal) {
        self.total_paid_amount -= paid;
        self.total_pending_amount += paid - interest;
        self.total_interest_accrued -= interest;
        self.total_payable_amount -= interest;
    }

    /// A loan transitioned into the fully-repaid state.
    pub fn mark_finished(&mut self) {
        self.finished_loans += 1;
        self.ongoing_loans = self.ongoing_loans.saturating_sub(1);
    }

    /// A reversal reopened a loan that a payment had fully repaid.
    pub fn unmark_finished(&mut self) {
        self.finished_loans = self.finished_loans.saturating_sub(1);
        self.ongoing_loans += 1;
    }

    /// Snapshot for embedding on loan and payment records.
    #[must_use]
    pub fn snapshot(&self) -> SummarySnapshot {
        SummarySnapshot {
            total_loan: self.total_loan_given,
            average_interest: self.average_interest_rate,
            total_interest: self.total_interest_accrued,
            total_amount: self.total_payable_amount,
            total_paid: self.total_paid_amount,
            total_pending: self.total_pending_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_record_loan_moves_count_weighted_average() {
        let mut s = SummaryLedger::default();
        s.record_loan(dec!(10000), dec!(12));
        assert_eq!(s.average_interest_rate, dec!(12));

        s.record_loan(dec!(90000), dec!(10));
        // Count-weighted: (12 + 10) / 2, principals irrelevant.
        assert_eq!(s.average_interest_rate, dec!(11));
        assert_eq!(s.total_loan_given, dec!(100000));
        assert_eq!(s.total_pending_amount, dec!(100000));
        assert_eq!(s.ongoing_loans, 2);
    }

    #[test]
    fn test_remove_loan_recomputes_mean_over_survivors() {
        let mut s = SummaryLedger::default();
        s.record_loan(dec!(10000), dec!(12));
        s.record_loan(dec!(5000), dec!(10));
        s.record_loan(dec!(2000), dec!(8));

        s.remove_loan(dec!(5000), &[dec!(12), dec!(8)]);
        assert_eq!(s.average_interest_rate, dec!(10));
        assert_eq!(s.total_loans, 2);
        assert_eq!(s.total_pending_amount, dec!(12000));
    }

    #[test]
    fn test_remove_last_loan_zeroes_average() {
        let mut s = SummaryLedger::default();
        s.record_loan(dec!(10000), dec!(12));
        s.remove_loan(dec!(10000), &[]);

        assert_eq!(s, SummaryLedger::default());
    }

    #[test]
    fn test_payment_grows_payable_by_interest() {
        let mut s = SummaryLedger::default();
        s.record_loan(dec!(10000), dec!(12));

        // 500 paid, 30 of it interest.
        s.record_payment(dec!(500), dec!(30));
        assert_eq!(s.total_paid_amount, dec!(500));
        assert_eq!(s.total_pending_amount, dec!(9530));
        assert_eq!(s.total_payable_amount, dec!(10030));
        assert_eq!(s.total_interest_accrued, dec!(30));
    }

    #[test]
    fn test_payment_reversal_round_trip() {
        let mut s = SummaryLedger::default();
        s.record_loan(dec!(10000), dec!(12));
        let before = s.clone();

        s.record_payment(dec!(500), dec!(30));
        s.mark_finished();
        s.unmark_finished();
        s.reverse_payment(dec!(500), dec!(30));

        assert_eq!(s, before);
    }

    #[test]
    fn test_finished_counters() {
        let mut s = SummaryLedger::default();
        s.record_loan(dec!(1000), dec!(10));
        s.record_loan(dec!(2000), dec!(10));

        s.mark_finished();
        assert_eq!(s.finished_loans, 1);
        assert_eq!(s.ongoing_loans, 1);

        s.unmark_finished();
        assert_eq!(s.finished_loans, 0);
        assert_eq!(s.ongoing_loans, 2);
    }
}
