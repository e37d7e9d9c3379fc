//! # Pending Queue
//!
//! Device-local persistence for operations recorded while offline.
//!
//! ## Queue Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Pending Queue (SQLite)                            │
//! │                                                                         │
//! │  pending_sales                      pending_payments                    │
//! │  ┌──────────┬─────────┬──────────┐  ┌──────────┬─────────┬──────────┐  │
//! │  │ temp_id  │ payload │created_at│  │ temp_id  │ payload │created_at│  │
//! │  │ (PK)     │ (JSON)  │ (FIFO)   │  │ (PK)     │ (JSON)  │ (FIFO)   │  │
//! │  └──────────┴─────────┴──────────┘  └──────────┴─────────┴──────────┘  │
//! │                                                                         │
//! │  • Separate file from the ledger database - the queue is device state  │
//! │  • Rows are deleted ONLY after the ledger accepts the replay           │
//! │  • temp_id doubles as the ledger's client_ref during replay            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

use colmado_core::{PaymentDraft, PendingPaymentEntry, PendingSaleEntry, SaleDraft};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Schema
// =============================================================================

/// The queue schema is tiny and versionless; created on open.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS pending_sales (
    temp_id     TEXT PRIMARY KEY NOT NULL,
    payload     TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pending_payments (
    temp_id     TEXT PRIMARY KEY NOT NULL,
    payload     TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pending_sales_created ON pending_sales (created_at);
CREATE INDEX IF NOT EXISTS idx_pending_payments_created ON pending_payments (created_at);
"#;

// =============================================================================
// Queue Counts
// =============================================================================

/// Snapshot of queue depth, for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueCounts {
    pub sales: i64,
    pub payments: i64,
}

impl QueueCounts {
    pub fn total(&self) -> i64 {
        self.sales + self.payments
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

// =============================================================================
// PendingQueue
// =============================================================================

/// The device-local FIFO of unsynced sales and payments.
///
/// Cloning is cheap (the pool is reference-counted). The queue file is
/// separate from the ledger database so that wiping or moving the ledger
/// never loses unsynced work.
#[derive(Debug, Clone)]
pub struct PendingQueue {
    pool: SqlitePool,
}

impl PendingQueue {
    /// Opens (creating if needed) the queue file at the given path.
    pub async fn open(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Opening pending queue");

        let connect_url = format!("sqlite://{}?mode=rwc", path.display());
        let options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| SyncError::DatabaseError(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        Self::connect(options, 2).await
    }

    /// Opens an in-memory queue (for testing).
    pub async fn in_memory() -> SyncResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| SyncError::DatabaseError(e.to_string()))?;
        Self::connect(options, 1).await
    }

    async fn connect(options: SqliteConnectOptions, max_connections: u32) -> SyncResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        debug!("Pending queue schema ready");

        Ok(PendingQueue { pool })
    }

    // =========================================================================
    // Enqueue
    // =========================================================================

    /// Records a sale taken while offline. Returns the queued entry with
    /// its generated `temp_id`.
    pub async fn enqueue_sale(&self, draft: &SaleDraft) -> SyncResult<PendingSaleEntry> {
        let entry = PendingSaleEntry {
            temp_id: Uuid::new_v4().to_string(),
            draft: draft.clone(),
            created_at: Utc::now(),
        };

        let payload = serde_json::to_string(&entry.draft)?;
        sqlx::query("INSERT INTO pending_sales (temp_id, payload, created_at) VALUES (?1, ?2, ?3)")
            .bind(&entry.temp_id)
            .bind(&payload)
            .bind(entry.created_at)
            .execute(&self.pool)
            .await?;

        debug!(temp_id = %entry.temp_id, "Sale queued for sync");
        Ok(entry)
    }

    /// Records a payment taken while offline.
    pub async fn enqueue_payment(&self, draft: &PaymentDraft) -> SyncResult<PendingPaymentEntry> {
        let entry = PendingPaymentEntry {
            temp_id: Uuid::new_v4().to_string(),
            draft: draft.clone(),
            created_at: Utc::now(),
        };

        let payload = serde_json::to_string(&entry.draft)?;
        sqlx::query(
            "INSERT INTO pending_payments (temp_id, payload, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(&entry.temp_id)
        .bind(&payload)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        debug!(temp_id = %entry.temp_id, "Payment queued for sync");
        Ok(entry)
    }

    // =========================================================================
    // Drain (read + remove)
    // =========================================================================

    /// All queued sales in FIFO order.
    pub async fn pending_sales(&self) -> SyncResult<Vec<PendingSaleEntry>> {
        let rows: Vec<(String, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT temp_id, payload, created_at FROM pending_sales ORDER BY created_at, rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(temp_id, payload, created_at)| {
                let draft = decode(&temp_id, &payload)?;
                Ok(PendingSaleEntry {
                    temp_id,
                    draft,
                    created_at,
                })
            })
            .collect()
    }

    /// All queued payments in FIFO order.
    pub async fn pending_payments(&self) -> SyncResult<Vec<PendingPaymentEntry>> {
        let rows: Vec<(String, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT temp_id, payload, created_at FROM pending_payments ORDER BY created_at, rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(temp_id, payload, created_at)| {
                let draft = decode(&temp_id, &payload)?;
                Ok(PendingPaymentEntry {
                    temp_id,
                    draft,
                    created_at,
                })
            })
            .collect()
    }

    /// Removes a sale entry after successful replay.
    pub async fn remove_sale(&self, temp_id: &str) -> SyncResult<()> {
        sqlx::query("DELETE FROM pending_sales WHERE temp_id = ?1")
            .bind(temp_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Removes a payment entry after successful replay.
    pub async fn remove_payment(&self, temp_id: &str) -> SyncResult<()> {
        sqlx::query("DELETE FROM pending_payments WHERE temp_id = ?1")
            .bind(temp_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Current queue depth.
    pub async fn counts(&self) -> SyncResult<QueueCounts> {
        let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pending_sales")
            .fetch_one(&self.pool)
            .await?;
        let payments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pending_payments")
            .fetch_one(&self.pool)
            .await?;
        Ok(QueueCounts { sales, payments })
    }

    /// Closes the queue pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Decodes a queue payload, blaming the owning entry on failure.
fn decode<T: serde::de::DeserializeOwned>(temp_id: &str, payload: &str) -> SyncResult<T> {
    if payload.is_empty() {
        return Err(SyncError::EmptyPayload {
            temp_id: temp_id.to_string(),
        });
    }
    serde_json::from_str(payload).map_err(|e| SyncError::DeserializationFailed(format!(
        "entry {}: {}",
        temp_id, e
    )))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use colmado_core::{PaymentMethod, SaleDraftItem, SaleType};

    fn sale_draft(product_id: &str) -> SaleDraft {
        SaleDraft {
            customer_id: Some("cust-1".into()),
            sale_type: SaleType::Credit,
            payment_method: None,
            items: vec![SaleDraftItem {
                product_id: product_id.into(),
                qty: 2,
                unit_price_cents: 5_900,
                was_price_overridden: false,
            }],
            shipping_cents: 0,
        }
    }

    fn payment_draft(ar_id: &str, amount_cents: i64) -> PaymentDraft {
        PaymentDraft {
            ar_id: ar_id.into(),
            amount_cents,
            method: PaymentMethod::Cash,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_enqueue_and_list_fifo() {
        let queue = PendingQueue::in_memory().await.unwrap();

        let first = queue.enqueue_sale(&sale_draft("prod-a")).await.unwrap();
        let second = queue.enqueue_sale(&sale_draft("prod-b")).await.unwrap();
        let third = queue.enqueue_sale(&sale_draft("prod-c")).await.unwrap();

        let listed = queue.pending_sales().await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|e| e.temp_id.as_str()).collect();
        assert_eq!(ids, vec![&first.temp_id, &second.temp_id, &third.temp_id]);
    }

    #[tokio::test]
    async fn test_payload_survives_round_trip() {
        let queue = PendingQueue::in_memory().await.unwrap();

        queue.enqueue_sale(&sale_draft("prod-rice")).await.unwrap();

        let listed = queue.pending_sales().await.unwrap();
        assert_eq!(listed.len(), 1);
        let draft = &listed[0].draft;
        assert_eq!(draft.customer_id.as_deref(), Some("cust-1"));
        assert_eq!(draft.sale_type, SaleType::Credit);
        assert_eq!(draft.items[0].product_id, "prod-rice");
        assert_eq!(draft.items[0].qty, 2);
    }

    #[tokio::test]
    async fn test_remove_deletes_only_the_named_entry() {
        let queue = PendingQueue::in_memory().await.unwrap();

        let keep = queue.enqueue_payment(&payment_draft("ar-1", 1_000)).await.unwrap();
        let gone = queue.enqueue_payment(&payment_draft("ar-2", 2_000)).await.unwrap();

        queue.remove_payment(&gone.temp_id).await.unwrap();

        let listed = queue.pending_payments().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].temp_id, keep.temp_id);
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_a_no_op() {
        let queue = PendingQueue::in_memory().await.unwrap();
        queue.enqueue_sale(&sale_draft("prod-a")).await.unwrap();

        queue.remove_sale("never-queued").await.unwrap();

        assert_eq!(queue.counts().await.unwrap().sales, 1);
    }

    #[tokio::test]
    async fn test_counts() {
        let queue = PendingQueue::in_memory().await.unwrap();
        assert!(queue.counts().await.unwrap().is_empty());

        queue.enqueue_sale(&sale_draft("prod-a")).await.unwrap();
        queue.enqueue_sale(&sale_draft("prod-b")).await.unwrap();
        queue.enqueue_payment(&payment_draft("ar-1", 500)).await.unwrap();

        let counts = queue.counts().await.unwrap();
        assert_eq!(counts.sales, 2);
        assert_eq!(counts.payments, 1);
        assert_eq!(counts.total(), 3);
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_reported_with_its_entry() {
        let queue = PendingQueue::in_memory().await.unwrap();

        sqlx::query(
            "INSERT INTO pending_sales (temp_id, payload, created_at) VALUES ('tmp-bad', 'not json', ?1)",
        )
        .bind(Utc::now())
        .execute(&queue.pool)
        .await
        .unwrap();

        let err = queue.pending_sales().await.unwrap_err();
        assert!(matches!(err, SyncError::DeserializationFailed(_)));
        assert!(err.to_string().contains("tmp-bad"));
    }
}
