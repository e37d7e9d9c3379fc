//! # AR Balance Engine
//!
//! The single place where an account receivable's balance and status are
//! computed.
//!
//! ## Why One Function?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Balance Recompute Flow                             │
//! │                                                                         │
//! │  create_payment ──┐                                                     │
//! │  cancel_payment ──┤                                                     │
//! │  create_return  ──┼──► recompute(total, active payments, returns)       │
//! │  cancel_return  ──┘          │                                          │
//! │                              ▼                                          │
//! │               balance = clamp(total − Σpayments − Σreturns, 0, total)   │
//! │               status  = Paid | Partial | Pending (pure fn of balance)   │
//! │                                                                         │
//! │  No call site hand-rolls the arithmetic, so the invariant               │
//! │  0 ≤ balance ≤ total holds identically everywhere.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No side effects, no I/O. Lifecycle operations pass in the ACTIVE
//! (non-cancelled) payment amounts and the ACTIVE return total; which rows
//! count as active is the caller's query, not this module's concern.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::ArStatus;

// =============================================================================
// Balance
// =============================================================================

/// The recomputed state of an AR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub balance_cents: i64,
    pub status: ArStatus,
}

/// Recomputes an AR's balance and status from its total and the set of
/// active payments and returns attributable to its sale.
///
/// `balance = clamp(total − Σ(active payments) − active_return_total, 0, total)`
///
/// ## Example
/// ```rust
/// use colmado_core::balance::recompute;
/// use colmado_core::types::ArStatus;
///
/// let b = recompute(10_000, &[4_000], 0);
/// assert_eq!(b.balance_cents, 6_000);
/// assert_eq!(b.status, ArStatus::Partial);
/// ```
pub fn recompute(total_cents: i64, active_payments: &[i64], active_return_total: i64) -> Balance {
    let paid: i64 = active_payments.iter().sum();
    let raw = Money::from_cents(total_cents)
        - Money::from_cents(paid)
        - Money::from_cents(active_return_total);
    let balance_cents = raw
        .clamp(Money::zero(), Money::from_cents(total_cents))
        .cents();

    Balance {
        balance_cents,
        status: status_for(balance_cents, total_cents),
    }
}

/// Status as a pure function of balance vs total.
///
/// `Paid ⟺ balance == 0`; `Pending ⟺ balance == total`; else `Partial`.
pub fn status_for(balance_cents: i64, total_cents: i64) -> ArStatus {
    if balance_cents == 0 {
        ArStatus::Paid
    } else if balance_cents == total_cents {
        ArStatus::Pending
    } else {
        ArStatus::Partial
    }
}

/// Clamps a requested payment amount to the open balance.
///
/// Overpayment is never allowed: the applied amount is
/// `min(requested, balance)`. Deliberate policy, not a bug - it prevents
/// negative balances from race conditions or stale client state.
#[inline]
pub fn clamp_payment(requested_cents: i64, balance_cents: i64) -> i64 {
    requested_cents.min(balance_cents)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ar_is_pending() {
        let b = recompute(10_000, &[], 0);
        assert_eq!(b.balance_cents, 10_000);
        assert_eq!(b.status, ArStatus::Pending);
    }

    #[test]
    fn test_partial_payment() {
        let b = recompute(10_000, &[4_000], 0);
        assert_eq!(b.balance_cents, 6_000);
        assert_eq!(b.status, ArStatus::Partial);
    }

    #[test]
    fn test_paid_off() {
        let b = recompute(10_000, &[4_000, 6_000], 0);
        assert_eq!(b.balance_cents, 0);
        assert_eq!(b.status, ArStatus::Paid);
    }

    #[test]
    fn test_returns_reduce_balance() {
        // total 5000, returned 2000, nothing paid
        let b = recompute(5_000, &[], 2_000);
        assert_eq!(b.balance_cents, 3_000);
        assert_eq!(b.status, ArStatus::Partial);
    }

    #[test]
    fn test_clamped_at_zero() {
        // payments + returns overshoot the total; balance never goes negative
        let b = recompute(5_000, &[4_000], 2_000);
        assert_eq!(b.balance_cents, 0);
        assert_eq!(b.status, ArStatus::Paid);
    }

    #[test]
    fn test_clamped_at_total() {
        // a negative payment amount could only push the balance above total;
        // the clamp holds the upper bound
        let b = recompute(5_000, &[-1_000], 0);
        assert_eq!(b.balance_cents, 5_000);
        assert_eq!(b.status, ArStatus::Pending);
    }

    #[test]
    fn test_status_correspondence() {
        for (balance, total, expected) in [
            (0, 100, ArStatus::Paid),
            (100, 100, ArStatus::Pending),
            (50, 100, ArStatus::Partial),
            (0, 0, ArStatus::Paid),
        ] {
            assert_eq!(status_for(balance, total), expected);
        }
    }

    #[test]
    fn test_clamp_payment_never_overpays() {
        assert_eq!(clamp_payment(4_000, 10_000), 4_000);
        assert_eq!(clamp_payment(12_000, 10_000), 10_000);
        assert_eq!(clamp_payment(10_000, 10_000), 10_000);
    }

    #[test]
    fn test_cancellation_reversibility() {
        // create-then-cancel restores the pre-payment balance exactly
        let before = recompute(10_000, &[4_000], 0);
        let with_second = recompute(10_000, &[4_000, 6_000], 0);
        assert_eq!(with_second.balance_cents, 0);

        let after_cancel = recompute(10_000, &[4_000], 0);
        assert_eq!(after_cancel, before);
    }

    #[test]
    fn test_invariant_holds_for_interleavings() {
        // balance stays within [0, total] under arbitrary active sets
        let total = 10_000;
        for payments in [vec![], vec![1], vec![9_999, 1], vec![10_000], vec![20_000]] {
            for returns in [0, 1, 5_000, 10_000, 20_000] {
                let b = recompute(total, &payments, returns);
                assert!(b.balance_cents >= 0);
                assert!(b.balance_cents <= total);
            }
        }
    }
}
