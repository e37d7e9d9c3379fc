//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every balance, payment and return total in the ledger is an i64      │
//! │    number of cents. The database, the balance engine and the queue      │
//! │    payloads all use cents; only a UI would ever format currency.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use colmado_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let total = price + Money::from_cents(500);
//! assert_eq!(total.cents(), 1599);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate arithmetic may go negative before clamping
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for queue payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Clamps the value into `[lo, hi]`.
    ///
    /// The AR balance invariant requires `0 ≤ balance ≤ total`; every
    /// recompute in the balance engine goes through this.
    #[inline]
    pub fn clamp(self, lo: Money, hi: Money) -> Money {
        Money(self.0.clamp(lo.0, hi.0))
    }

    /// Multiplies money by a quantity (line totals).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Splits a tax-INCLUSIVE total into subtotal and tax.
    ///
    /// Sale and return totals already include tax; the subtotal is what
    /// remains after backing the tax out:
    ///
    /// ```text
    /// subtotal = round(total / (1 + rate))
    /// tax      = total - subtotal
    /// ```
    ///
    /// Integer math with i128 intermediates, rounding half up on the
    /// subtotal so subtotal + tax always reconstructs the total exactly.
    ///
    /// ## Example
    /// ```rust
    /// use colmado_core::money::Money;
    /// use colmado_core::types::TaxRate;
    ///
    /// let total = Money::from_cents(11800); // includes 18% tax
    /// let split = total.split_tax_included(TaxRate::from_bps(1800));
    /// assert_eq!(split.subtotal_cents, 10000);
    /// assert_eq!(split.tax_cents, 1800);
    /// ```
    pub fn split_tax_included(&self, rate: crate::types::TaxRate) -> TaxSplit {
        let divisor = 10_000i128 + rate.bps() as i128;
        let subtotal = (self.0 as i128 * 10_000 + divisor / 2) / divisor;
        let subtotal_cents = subtotal as i64;
        TaxSplit {
            subtotal_cents,
            tax_cents: self.0 - subtotal_cents,
            total_cents: self.0,
        }
    }
}

/// Result of backing tax out of a tax-inclusive total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSplit {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation for debugging. UI formatting is out of scope.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
