//! # Error Types
//!
//! The ledger error taxonomy shared by every entry point.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  colmado-core errors (this file)                                        │
//! │  └── LedgerError      - Validation + state-machine violations           │
//! │                                                                         │
//! │  colmado-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                     │
//! │      (folded into LedgerError::Storage at the lifecycle boundary)       │
//! │                                                                         │
//! │  colmado-sync errors (separate crate)                                   │
//! │  └── SyncError        - Queue/replay failures                           │
//! │                                                                         │
//! │  Flow: DbError → LedgerError → caller (UI shows message; the sync       │
//! │  reconciler logs it and leaves the queue entry for the next pass)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (entity, id, quantities)
//! 3. Errors are enum variants, never String
//! 4. Cross-account lookups surface as `NotFound`, never `Forbidden`,
//!    so record existence is never leaked across accounts

use thiserror::Error;

// =============================================================================
// Ledger Error
// =============================================================================

/// Errors raised by ledger entry points.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The actor could not be resolved to an active user in the account.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Record absent, or referenced from another account.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Authenticated but lacking the required capability.
    #[error("Not allowed to {action}")]
    Forbidden { action: &'static str },

    /// Payment amount is non-positive.
    #[error("Payment amount must be greater than 0, got {amount_cents}")]
    InvalidAmount { amount_cents: i64 },

    /// Return quantity is non-positive.
    #[error("Return quantity must be greater than 0, got {qty}")]
    InvalidQty { qty: i64 },

    /// The AR is already paid off; no further payments are accepted.
    #[error("Account receivable {ar_id} is already settled")]
    AlreadySettled { ar_id: String },

    /// The payment or return is already cancelled (CANCELLED is terminal).
    #[error("{entity} {id} is already cancelled")]
    AlreadyCancelled { entity: &'static str, id: String },

    /// The originating sale was cancelled; no returns can be taken against it.
    #[error("Sale {sale_id} is cancelled")]
    SaleCancelled { sale_id: String },

    /// Requested return quantity exceeds what remains returnable.
    #[error("Cannot return {requested} of sale item {sale_item_id}: only {available} available")]
    ExceedsAvailable {
        sale_item_id: String,
        requested: i64,
        available: i64,
    },

    /// The return line's product does not match the sale line.
    #[error("Product {product_id} does not match sale item {sale_item_id}")]
    ProductMismatch {
        sale_item_id: String,
        product_id: String,
    },

    /// A credit sale has active payments; it cannot be cancelled.
    #[error("Sale {sale_id} has recorded payments and cannot be cancelled")]
    HasActivePayments { sale_id: String },

    /// Insufficient stock to complete a sale.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// A sale draft without items is rejected.
    #[error("Sale has no items")]
    EmptySale,

    /// A return request without items is rejected.
    #[error("Return has no items")]
    EmptyReturn,

    /// Credit sales require a customer for the AR.
    #[error("Credit sales require a customer")]
    CustomerRequired,

    /// Underlying storage failure (connection, constraint, transaction).
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// True for violations of the ACTIVE → CANCELLED state machine or of
    /// the settled-AR rule. The reconciler keeps these queued anyway: the
    /// condition may be another device's doing and may not hold tomorrow.
    pub fn is_state_violation(&self) -> bool {
        matches!(
            self,
            LedgerError::AlreadySettled { .. }
                | LedgerError::AlreadyCancelled { .. }
                | LedgerError::SaleCancelled { .. }
        )
    }
}

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LedgerError::ExceedsAvailable {
            sale_item_id: "item-1".to_string(),
            requested: 4,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "Cannot return 4 of sale item item-1: only 3 available"
        );

        let err = LedgerError::not_found("Account receivable", "ar-9");
        assert_eq!(err.to_string(), "Account receivable not found: ar-9");
    }

    #[test]
    fn test_state_violation_classification() {
        assert!(LedgerError::AlreadySettled { ar_id: "a".into() }.is_state_violation());
        assert!(LedgerError::AlreadyCancelled {
            entity: "Payment",
            id: "p".into()
        }
        .is_state_violation());
        assert!(!LedgerError::InvalidAmount { amount_cents: -5 }.is_state_violation());
        assert!(!LedgerError::Storage("disk full".into()).is_state_violation());
    }
}
