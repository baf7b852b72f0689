//! Day-based simple interest.
//!
//! Interest is never pre-scheduled. It accrues lazily whenever a loan is
//! touched by a payment or settlement, over the days elapsed since the
//! loan was last touched.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

const SECONDS_PER_DAY: i64 = 86_400;

/// Denominator for percent-per-annum simple interest over days
/// (`100 * 365`).
const RATE_DAY_BASIS: Decimal = Decimal::from_parts(36_500, 0, 0, false, 0);

/// Elapsed days from `from` to `to`, rounded up, with a one-day floor.
///
/// A loan repaid within hours of disbursal still accrues one full day of
/// interest; a clock that reads slightly behind `from` does too.
#[must_use]
pub fn accrual_days(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let seconds = (to - from).num_seconds();
    if seconds <= 0 {
        return 1;
    }
    let days = (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    days.max(1)
}

/// Simple interest on `principal` at `annual_rate` percent per annum for
/// `days` days, rounded half-away-from-zero to a whole currency unit.
#[must_use]
pub fn simple_interest(principal: Decimal, annual_rate: Decimal, days: i64) -> Decimal {
    (principal * annual_rate * Decimal::from(days) / RATE_DAY_BASIS)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// One interest accrual on a loan, computed at payment or settlement
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accrual {
    /// Days the interest covers.
    pub days: i64,
    /// Principal the interest was charged on.
    pub principal_pending: Decimal,
    /// Interest charged for the period.
    pub interest: Decimal,
    /// Principal plus interest, the amount now payable.
    pub total_payable: Decimal,
}

/// Accrues interest on a loan touched at `touched_at`, as of `now`.
///
/// The charge base is the pending principal, or the original principal
/// for a loan never paid against.
#[must_use]
pub fn accrue(
    principal: Decimal,
    pending: Decimal,
    annual_rate: Decimal,
    touched_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Accrual {
    let days = accrual_days(touched_at, now);
    let principal_pending = if pending > Decimal::ZERO {
        pending
    } else {
        principal
    };
    let interest = simple_interest(principal_pending, annual_rate, days);

    Accrual {
        days,
        principal_pending,
        interest,
        total_payable: principal_pending + interest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[rstest]
    #[case(Duration::zero(), 1)] // same-instant floor
    #[case(Duration::hours(3), 1)]
    #[case(Duration::hours(24), 1)]
    #[case(Duration::hours(25), 2)] // partial days round up
    #[case(Duration::days(36), 36)]
    #[case(Duration::days(-5), 1)] // clock skew floor
    fn test_accrual_days(#[case] elapsed: Duration, #[case] expected: i64) {
        assert_eq!(accrual_days(t0(), t0() + elapsed), expected);
    }

    #[test]
    fn test_simple_interest_exact() {
        // 36500 at 10% for 1 day is exactly 10.
        assert_eq!(simple_interest(dec!(36500), dec!(10), 1), dec!(10));
    }

    #[test]
    fn test_simple_interest_rounds_half_away_from_zero() {
        // 50000 * 12 * 30 / 36500 = 493.15... -> 493
        assert_eq!(simple_interest(dec!(50000), dec!(12), 30), dec!(493));
        // 18250 * 10 * 1 / 36500 = 5.0 exactly
        assert_eq!(simple_interest(dec!(18250), dec!(10), 1), dec!(5));
        // 5475 * 10 * 1 / 36500 = 1.5 -> 2
        assert_eq!(simple_interest(dec!(5475), dec!(10), 1), dec!(2));
    }

    #[test]
    fn test_accrue_uses_pending_when_partially_paid() {
        let acc = accrue(dec!(10000), dec!(4000), dec!(12), t0(), t0() + Duration::days(10));
        assert_eq!(acc.days, 10);
        assert_eq!(acc.principal_pending, dec!(4000));
        // 4000 * 12 * 10 / 36500 = 13.15... -> 13
        assert_eq!(acc.interest, dec!(13));
        assert_eq!(acc.total_payable, dec!(4013));
    }

    #[test]
    fn test_accrue_falls_back_to_principal_when_untouched() {
        let acc = accrue(dec!(10000), dec!(0), dec!(12), t0(), t0() + Duration::hours(2));
        assert_eq!(acc.days, 1);
        assert_eq!(acc.principal_pending, dec!(10000));
        // 10000 * 12 * 1 / 36500 = 3.28... -> 3
        assert_eq!(acc.interest, dec!(3));
    }
}
