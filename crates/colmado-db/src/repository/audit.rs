//! # Audit Trail
//!
//! Append-only record of who did what to which document.
//!
//! ## Write Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Lifecycle transaction COMMITs first, audit is written after:          │
//! │                                                                         │
//! │  BEGIN ... COMMIT            ← ledger state is authoritative           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  audit.record(...)           ← best effort                             │
//! │       │                                                                 │
//! │       ├── Ok  → trail entry exists                                     │
//! │       └── Err → warn!() and move on; the ledger is never rolled        │
//! │                 back because the trail could not be written            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::DbResult;

/// One audit trail entry.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct AuditEntry {
    pub id: String,
    pub account_id: String,
    pub user_id: String,
    pub action: String,
    pub entity: String,
    pub entity_id: String,
    /// JSON detail payload (amounts, codes, reasons).
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Repository for the append-only audit log.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    /// Creates a new AuditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Appends one entry to the trail.
    pub async fn record(
        &self,
        account_id: &str,
        user_id: &str,
        action: &str,
        entity: &str,
        entity_id: &str,
        detail: Option<serde_json::Value>,
    ) -> DbResult<()> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let detail = detail.map(|d| d.to_string());

        sqlx::query(
            r#"
            INSERT INTO audit_log (id, account_id, user_id, action, entity, entity_id, detail, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(id)
        .bind(account_id)
        .bind(user_id)
        .bind(action)
        .bind(entity)
        .bind(entity_id)
        .bind(detail)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Most recent entries for an account, newest first.
    pub async fn list_recent(&self, account_id: &str, limit: i64) -> DbResult<Vec<AuditEntry>> {
        let entries = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT id, account_id, user_id, action, entity, entity_id, detail, created_at
            FROM audit_log
            WHERE account_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
