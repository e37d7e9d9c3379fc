//! # Ledger Lifecycle Managers
//!
//! The single write path into the AR ledger. Every operation here is one
//! SQLite transaction: validate → mutate → recompute balance → commit.
//!
//! ## Operation Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ledger Operations                                │
//! │                                                                         │
//! │  sales (sale.rs)          payments (payment.rs)   returns (returns.rs) │
//! │  ├── create_sale          ├── create_payment      ├── create_return    │
//! │  └── cancel_sale          └── cancel_payment      └── cancel_return    │
//! │                                                                         │
//! │  reads (this file)                                                      │
//! │  └── list_open_ar                                                       │
//! │                                                                         │
//! │  Shared per-operation shape:                                            │
//! │    1. BEGIN                                                             │
//! │    2. resolve actor            (NotAuthenticated on failure)            │
//! │    3. replay check             (client_ref already recorded?)           │
//! │    4. validate + mutate rows                                            │
//! │    5. recompute AR balance     (colmado_core::balance, never inline)    │
//! │    6. COMMIT                                                            │
//! │    7. audit trail write        (best effort, after commit)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod payment;
mod returns;
mod sale;

#[cfg(test)]
pub(crate) mod fixtures;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::warn;

use colmado_core::{Actor, LedgerError, LedgerResult, TaxRate};

use crate::error::DbError;
use crate::repository::ar::{self, OpenArEntry, OpenArQuery};
use crate::repository::audit::AuditRepository;

// =============================================================================
// Ledger
// =============================================================================

/// Entry point for every ledger mutation. Obtained from
/// [`Database::ledger`](crate::Database::ledger).
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
}

/// Per-account settings affecting document math.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Settings {
    pub tax_rate: TaxRate,
    pub allow_negative_stock: bool,
}

#[derive(sqlx::FromRow)]
struct UserFlags {
    is_admin: bool,
    can_cancel_payments: bool,
    can_cancel_returns: bool,
}

impl Ledger {
    /// Creates a new Ledger over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Ledger { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Resolves the acting user inside the current transaction.
    ///
    /// Unknown id, wrong account, or deactivated user all resolve to
    /// `NotAuthenticated`.
    pub(crate) async fn resolve_actor(
        &self,
        conn: &mut SqliteConnection,
        account_id: &str,
        user_id: &str,
    ) -> LedgerResult<Actor> {
        let flags = sqlx::query_as::<_, UserFlags>(
            r#"
            SELECT is_admin, can_cancel_payments, can_cancel_returns
            FROM users
            WHERE id = ?1 AND account_id = ?2 AND is_active = 1
            "#,
        )
        .bind(user_id)
        .bind(account_id)
        .fetch_optional(conn)
        .await
        .map_err(storage)?;

        let flags = flags.ok_or(LedgerError::NotAuthenticated)?;

        Ok(Actor {
            account_id: account_id.to_string(),
            user_id: user_id.to_string(),
            is_admin: flags.is_admin,
            can_cancel_payments: flags.can_cancel_payments,
            can_cancel_returns: flags.can_cancel_returns,
        })
    }

    /// Loads the account's settings row, falling back to defaults (18%
    /// ITBIS, no negative stock) when none exists yet.
    pub(crate) async fn settings(
        &self,
        conn: &mut SqliteConnection,
        account_id: &str,
    ) -> LedgerResult<Settings> {
        let row: Option<(i64, bool)> = sqlx::query_as(
            r#"
            SELECT itbis_rate_bp, allow_negative_stock
            FROM account_settings
            WHERE account_id = ?1
            "#,
        )
        .bind(account_id)
        .fetch_optional(conn)
        .await
        .map_err(storage)?;

        Ok(match row {
            Some((bp, allow)) => Settings {
                tax_rate: TaxRate::from_bps(bp as u32),
                allow_negative_stock: allow,
            },
            None => Settings {
                tax_rate: TaxRate::default(),
                allow_negative_stock: false,
            },
        })
    }

    /// Writes an audit entry after the owning transaction committed.
    ///
    /// Best effort: a failed trail write is logged and swallowed, the
    /// committed ledger state stands.
    pub(crate) async fn audit(
        &self,
        account_id: &str,
        user_id: &str,
        action: &str,
        entity: &str,
        entity_id: &str,
        detail: serde_json::Value,
    ) {
        let repo = AuditRepository::new(self.pool.clone());
        if let Err(e) = repo
            .record(account_id, user_id, action, entity, entity_id, Some(detail))
            .await
        {
            warn!(
                action = action,
                entity_id = entity_id,
                error = %e,
                "Audit trail write failed"
            );
        }
    }

    /// Lists open ARs (pending or partial) for an account, oldest first,
    /// with paging and an optional customer/invoice search.
    pub async fn list_open_ar(
        &self,
        account_id: &str,
        query: &OpenArQuery,
    ) -> LedgerResult<Vec<OpenArEntry>> {
        Ok(ar::list_open(&self.pool, account_id, query).await?)
    }
}

/// Folds a raw sqlx error into the ledger taxonomy.
pub(crate) fn storage(e: sqlx::Error) -> LedgerError {
    DbError::from(e).into()
}
