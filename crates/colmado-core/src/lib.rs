//! # colmado-core: Pure Ledger Logic for Colmado POS
//!
//! This crate is the **heart** of the AR ledger. It contains the balance
//! engine, validation rules, and domain types as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Colmado POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    POS Terminals (per device)                   │   │
//! │  │   sell ──► collect payment ──► take return ──► view open AR    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            colmado-sync (Queue + Reconciler + Agent)            │   │
//! │  │      offline queue, FIFO replay, idempotent re-delivery         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ colmado-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌───────────────┐  │   │
//! │  │   │   types   │ │   money   │ │  balance  │ │  validation   │  │   │
//! │  │   │ Sale, AR  │ │   Money   │ │ recompute │ │ return bounds │  │   │
//! │  │   │  Payment  │ │ tax split │ │  status   │ │ payment amt   │  │   │
//! │  │   └───────────┘ └───────────┘ └───────────┘ └───────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  colmado-db (Ledger Store)                      │   │
//! │  │        SQLite transactions, migrations, lifecycle managers      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Sale, AccountReceivable, Payment, Return, drafts)
//! - [`money`] - Money type with integer arithmetic and tax-inclusive split
//! - [`balance`] - The AR balance engine (recompute, status, payment clamp)
//! - [`codes`] - Invoice/receipt/return code formatting
//! - [`validation`] - Return-item and payment-amount validation
//! - [`error`] - The ledger error taxonomy
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use colmado_core::balance::{clamp_payment, recompute};
//! use colmado_core::types::ArStatus;
//!
//! // A credit sale of RD$118.00 with one RD$40.00 payment on record.
//! let b = recompute(11_800, &[4_000], 0);
//! assert_eq!(b.balance_cents, 7_800);
//! assert_eq!(b.status, ArStatus::Partial);
//!
//! // A customer hands over more than they owe: the excess is never applied.
//! assert_eq!(clamp_payment(10_000, 7_800), 7_800);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod balance;
pub mod codes;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use colmado_core::Money` instead of
// `use colmado_core::money::Money`

pub use balance::Balance;
pub use error::{LedgerError, LedgerResult};
pub use money::{Money, TaxSplit};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Invoice series used by every account in v0.1.
///
/// The schema carries `invoice_series` on each sale so additional series
/// (fiscal receipt types, per-register series) can be introduced without a
/// migration; until then every invoice is issued under series "A".
pub const DEFAULT_INVOICE_SERIES: &str = "A";

/// Default ITBIS rate in basis points (18%).
///
/// Used when an account has no `account_settings` row yet. Prices are
/// tax-inclusive; the rate only drives the subtotal/tax split on documents.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1_800;
