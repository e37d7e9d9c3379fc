//! # colmado-db: Ledger Store for Colmado POS
//!
//! This crate owns the authoritative accounts-receivable ledger: SQLite
//! schema, lifecycle transactions, sequence counters, and the audit trail.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Colmado POS Data Flow                              │
//! │                                                                         │
//! │  POS terminal / sync reconciler                                        │
//! │       │                                                                 │
//! │       │  db.ledger().create_payment(account, user, &draft, client_ref) │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    colmado-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │    Ledger     │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (ledger/)    │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ sale          │    │ 001_init.sql │  │   │
//! │  │   │ WAL, FK on    │    │ payment       │    │ ...          │  │   │
//! │  │   │               │    │ returns       │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   One transaction per operation; balance math delegated to     │   │
//! │  │   colmado-core; audit written after commit.                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL mode)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`ledger`] - Lifecycle managers (the only write path)
//! - [`repository`] - Query helpers (sequences, AR, audit)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use colmado_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/colmado.db")).await?;
//!
//! let receipt = db
//!     .ledger()
//!     .create_payment(&account_id, &user_id, &draft, None)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use ledger::Ledger;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::ar::{ArPaymentSummary, OpenArEntry, OpenArQuery};
pub use repository::audit::AuditRepository;
