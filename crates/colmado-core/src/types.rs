//! # Domain Types
//!
//! Core domain types for the accounts-receivable ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐   ┌─────────────────┐  │
//! │  │      Sale       │──►│  AccountReceivable   │◄──│    Payment      │  │
//! │  │  ─────────────  │1:1│  ──────────────────  │1:N│  ─────────────  │  │
//! │  │  invoice_code   │   │  total_cents (fixed) │   │  receipt_code   │  │
//! │  │  sale_type      │   │  balance_cents       │   │  amount_cents   │  │
//! │  │  cancelled_at   │   │  status              │   │  cancelled_at   │  │
//! │  └────────┬────────┘   └──────────────────────┘   └─────────────────┘  │
//! │           │ 1:N                                                        │
//! │  ┌────────┴────────┐   ┌─────────────────┐                             │
//! │  │     Return      │──►│   ReturnItem    │  (AR only exists when       │
//! │  │  return_code    │1:N│   qty vs sold   │   sale_type == Credit)      │
//! │  │  cancelled_at   │   └─────────────────┘                             │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business code: (invoice_code, receipt_code, return_code) - sequential,
//!   human-readable, issued by per-account counters
//!
//! Cancellation is a soft state everywhere: `cancelled_at`/`cancelled_by`
//! are set, the row is never deleted, and only ACTIVE → CANCELLED exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000; 1800 bps = 18.00% (the default rate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    /// Default rate is 18% (1800 bps), matching new-account settings.
    fn default() -> Self {
        TaxRate(1800)
    }
}

// =============================================================================
// Enums
// =============================================================================

/// How a sale is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SaleType {
    /// Paid in full at the counter. No AR is created.
    Cash,
    /// Sold on credit. An AR is created atomically with the sale.
    Credit,
}

/// Status of an account receivable.
///
/// Always a pure function of `balance_cents` vs `total_cents`:
/// - `Paid`    ⟺ balance == 0
/// - `Pending` ⟺ balance == total
/// - `Partial` otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ArStatus {
    Pending,
    Partial,
    Paid,
}

/// Tender used for a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Other,
}

// =============================================================================
// Actor
// =============================================================================

/// An authenticated user acting against the ledger.
///
/// Every entry point is scoped to the actor's account: lookups that cross
/// accounts resolve as `NotFound`, never as a distinct "forbidden" that
/// would leak existence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub account_id: String,
    pub user_id: String,
    pub is_admin: bool,
    pub can_cancel_payments: bool,
    pub can_cancel_returns: bool,
}

impl Actor {
    /// True when the actor may cancel payments (capability or admin).
    pub fn may_cancel_payments(&self) -> bool {
        self.is_admin || self.can_cancel_payments
    }

    /// True when the actor may cancel returns (capability or admin).
    pub fn may_cancel_returns(&self) -> bool {
        self.is_admin || self.can_cancel_returns
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Invoice header. Immutable once created except for cancellation markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub account_id: String,
    pub invoice_series: String,
    pub invoice_number: i64,
    /// Unique per account, e.g. `A-00042`.
    pub invoice_code: String,
    pub sale_type: SaleType,
    /// Tender for cash sales; `None` for credit sales.
    pub payment_method: Option<PaymentMethod>,
    pub customer_id: Option<String>,
    pub user_id: String,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
    /// Client-generated idempotency key (offline replay); unique per account.
    pub client_ref: Option<String>,
    pub sold_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
}

impl Sale {
    /// True when the sale has not been cancelled.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.cancelled_at.is_none()
    }
}

/// A line item in a sale. Quantity and unit price are frozen at sale time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub qty: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub was_price_overridden: bool,
}

// =============================================================================
// Account Receivable
// =============================================================================

/// The outstanding-balance record for one credit sale.
///
/// Created atomically with the sale, mutated only inside payment/return
/// lifecycle transactions, never deleted. Invariant:
/// `balance_cents == total_cents − Σ(active payments) − Σ(active returns)`,
/// clamped to `[0, total_cents]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AccountReceivable {
    pub id: String,
    pub sale_id: String,
    pub customer_id: String,
    /// Fixed at creation = Sale.total_cents.
    pub total_cents: i64,
    pub balance_cents: i64,
    pub status: ArStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Payment
// =============================================================================

/// A receipt against an AR.
///
/// Immutable once issued: cancellation only sets `cancelled_at`/`cancelled_by`
/// so the receipt remains a permanent, inspectable record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub account_id: String,
    pub ar_id: String,
    pub user_id: String,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub note: Option<String>,
    /// Strictly increasing per account, issued by the receipt counter.
    pub receipt_number: i64,
    /// Derived, zero-padded: `R-000042`.
    pub receipt_code: String,
    /// Client-generated idempotency key (offline replay); unique per account.
    pub client_ref: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
}

impl Payment {
    /// True when the payment counts toward the AR balance.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.cancelled_at.is_none()
    }
}

// =============================================================================
// Return
// =============================================================================

/// A reversal of some quantity of previously sold line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Return {
    pub id: String,
    pub account_id: String,
    pub sale_id: String,
    pub user_id: String,
    /// Account-global sequence number.
    pub return_number: i64,
    /// Derived, zero-padded: `DEV-00042`.
    pub return_code: String,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    /// Σ(qty × unit_price_cents) over the return items.
    pub total_cents: i64,
    pub notes: Option<String>,
    pub returned_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
}

impl Return {
    /// True when the return counts toward stock and the AR balance.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.cancelled_at.is_none()
    }
}

/// One returned line, referencing the original sale item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReturnItem {
    pub id: String,
    pub return_id: String,
    pub sale_item_id: String,
    pub product_id: String,
    pub qty: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

// =============================================================================
// Operation Inputs
// =============================================================================

/// Input for creating a sale. The same shape is used by the online path and
/// by offline replay (where it travels inside a `PendingSaleEntry`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDraft {
    pub customer_id: Option<String>,
    pub sale_type: SaleType,
    pub payment_method: Option<PaymentMethod>,
    pub items: Vec<SaleDraftItem>,
    pub shipping_cents: i64,
}

/// One cart line in a sale draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDraftItem {
    pub product_id: String,
    pub qty: i64,
    pub unit_price_cents: i64,
    pub was_price_overridden: bool,
}

/// Input for recording a payment against an AR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDraft {
    pub ar_id: String,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub note: Option<String>,
}

/// One requested line of a return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnRequestItem {
    pub sale_item_id: String,
    pub product_id: String,
    pub qty: i64,
    pub unit_price_cents: i64,
}

// =============================================================================
// Operation Results
// =============================================================================

/// Result of creating a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub sale_id: String,
    pub invoice_code: String,
    pub sale_type: SaleType,
}

/// Result of recording a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment_id: String,
    pub receipt_code: String,
    /// The amount actually applied (requested amount clamped to the balance).
    pub applied_cents: i64,
    pub new_balance_cents: i64,
}

/// Result of creating a return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnReceipt {
    pub return_id: String,
    pub return_code: String,
}

// =============================================================================
// Pending Queue Entries (client-local only)
// =============================================================================

/// A sale recorded while offline, waiting to be replayed.
///
/// `temp_id` is client-generated and is NOT the eventual server id; it
/// doubles as the idempotency key during replay. These entries exist only
/// until replay succeeds - the write-ahead log of the offline client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSaleEntry {
    pub temp_id: String,
    pub draft: SaleDraft,
    /// FIFO order key for replay.
    pub created_at: DateTime<Utc>,
}

/// A payment recorded while offline, waiting to be replayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingPaymentEntry {
    pub temp_id: String,
    pub draft: PaymentDraft,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
