//! The fine engine: pure overdue-fine policy over explicit calendar dates.
//!
//! Everything here is a stateless function of its arguments. Both the live
//! balance shown to members and the checkout gate are computed through this
//! module, so two calls with the same inputs must agree.
//!
//! Numeric policy: each loan's fine is settled to cents on its own, then the
//! per-loan amounts are summed. Fines are integer cents throughout
//! ([`Money`]), so per-loan amounts are exact and the order is preserved by
//! construction. Historical `fine_charged` amounts depend on this; do not
//! change it to sum-then-round.

use chrono::{Days, NaiveDate};

use bookstack_core::Money;

/// Fixed loan period: a checkout is due back 14 days later.
pub const LOAN_PERIOD_DAYS: u64 = 14;

/// Fine accrued per whole day past the due date.
pub const FINE_PER_DAY: Money = Money::from_cents(50);

/// Members owing strictly more than this cannot check out further books.
pub const FINE_BLOCK_THRESHOLD: Money = Money::from_cents(1000);

/// Due date for a loan opened on `checkout_date`.
pub fn due_date(checkout_date: NaiveDate) -> NaiveDate {
    checkout_date + Days::new(LOAN_PERIOD_DAYS)
}

/// Fine accrued by a single loan as of `as_of`.
///
/// Zero up to and including the due date; afterwards it grows by
/// [`FINE_PER_DAY`] per whole overdue day. Callers guarantee
/// `as_of >= checkout_date` for open loans (return-date validation lives in
/// the member ledger).
pub fn fine_for_loan(checkout_date: NaiveDate, as_of: NaiveDate) -> Money {
    let due = due_date(checkout_date);
    if as_of <= due {
        return Money::ZERO;
    }
    let overdue_days = (as_of - due).num_days();
    Money::from_cents(overdue_days * FINE_PER_DAY.cents())
}

/// Aggregate fine across a member's active loans as of `as_of`.
///
/// Sums already-settled per-loan amounts (see the module note on rounding
/// order). Pure and idempotent.
pub fn total_fine<'a, I>(checkout_dates: I, as_of: NaiveDate) -> Money
where
    I: IntoIterator<Item = &'a NaiveDate>,
{
    checkout_dates
        .into_iter()
        .map(|checkout| fine_for_loan(*checkout, as_of))
        .sum()
}

/// Fine-block gate: strictly greater than the threshold blocks; a balance
/// exactly at the threshold is still allowed to borrow.
pub fn blocks_checkout(balance: Money) -> bool {
    balance > FINE_BLOCK_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn no_fine_before_or_on_due_date() {
        let checkout = date(2026, 2, 1);
        assert_eq!(fine_for_loan(checkout, date(2026, 2, 1)), Money::ZERO);
        assert_eq!(fine_for_loan(checkout, date(2026, 2, 10)), Money::ZERO);
        // Due date itself is still fine-free.
        assert_eq!(fine_for_loan(checkout, date(2026, 2, 15)), Money::ZERO);
    }

    #[test]
    fn fifty_cents_per_overdue_day() {
        let checkout = date(2026, 2, 1);
        assert_eq!(
            fine_for_loan(checkout, date(2026, 2, 16)),
            Money::from_cents(50)
        );
        // Feb 21 is 6 days past the Feb 15 due date.
        assert_eq!(
            fine_for_loan(checkout, date(2026, 2, 21)),
            Money::from_cents(300)
        );
    }

    #[test]
    fn total_fine_sums_per_loan_amounts() {
        let checkouts = [date(2026, 2, 1), date(2026, 2, 1), date(2026, 2, 1)];
        assert_eq!(
            total_fine(&checkouts, date(2026, 2, 21)),
            Money::from_cents(900)
        );
    }

    #[test]
    fn total_fine_of_no_loans_is_zero() {
        let no_loans: [NaiveDate; 0] = [];
        assert_eq!(total_fine(&no_loans, date(2026, 2, 21)), Money::ZERO);
    }

    #[test]
    fn block_threshold_is_strict() {
        assert!(!blocks_checkout(Money::from_cents(1000)));
        assert!(blocks_checkout(Money::from_cents(1001)));
    }

    proptest! {
        #[test]
        fn zero_within_loan_period(offset in 0u64..=LOAN_PERIOD_DAYS) {
            let checkout = date(2026, 2, 1);
            let as_of = checkout + Days::new(offset);
            prop_assert_eq!(fine_for_loan(checkout, as_of), Money::ZERO);
        }

        #[test]
        fn grows_linearly_past_due_date(overdue in 1u64..3650) {
            let checkout = date(2026, 2, 1);
            let as_of = due_date(checkout) + Days::new(overdue);
            prop_assert_eq!(
                fine_for_loan(checkout, as_of),
                Money::from_cents(overdue as i64 * FINE_PER_DAY.cents())
            );
        }

        #[test]
        fn total_equals_sum_of_parts(
            offsets in proptest::collection::vec(0u64..120, 0..8),
            as_of_offset in 0u64..240,
        ) {
            let base = date(2026, 1, 1);
            let checkouts: Vec<NaiveDate> =
                offsets.iter().map(|o| base + Days::new(*o)).collect();
            let as_of = base + Days::new(as_of_offset);

            let summed: Money = checkouts
                .iter()
                .map(|c| fine_for_loan(*c, as_of))
                .sum();
            prop_assert_eq!(total_fine(&checkouts, as_of), summed);
            // Idempotent: same inputs, same answer.
            prop_assert_eq!(total_fine(&checkouts, as_of), total_fine(&checkouts, as_of));
        }
    }
}
