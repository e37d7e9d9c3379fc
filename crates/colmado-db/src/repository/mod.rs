//! # Repository Module
//!
//! Query helpers shared by the ledger's lifecycle transactions.
//!
//! ## Two Kinds of Helpers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Transaction-scoped helpers (free functions on &mut SqliteConnection)  │
//! │  ├── sequence::next_number   ← atomic counter upsert                   │
//! │  └── ar::*                   ← AR reads/writes inside a lifecycle tx   │
//! │                                                                         │
//! │  Pool-scoped repositories (own a pool clone)                           │
//! │  └── audit::AuditRepository  ← append-only trail, written post-commit  │
//! │                                                                         │
//! │  The lifecycle managers in `crate::ledger` compose these inside a      │
//! │  single transaction per operation; nothing here begins or commits      │
//! │  transactions on its own.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod ar;
pub mod audit;
pub mod sequence;
