//! # Sequence Counters
//!
//! Per-account monotonic counters backing invoice, receipt, and return
//! numbers.
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Counter consumption happens INSIDE the document's transaction:        │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    next_number(tx, account, "receipt")   ← upsert, returns new value   │
//! │    INSERT INTO payments (..., receipt_number, ...)                     │
//! │    UPDATE accounts_receivable ...                                      │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  A rollback discards the number together with the document, so two     │
//! │  committed documents never share a number and the counter never        │
//! │  skips on success. (Gaps after rollbacks are acceptable; duplicates    │
//! │  are not.)                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqliteConnection;

use crate::error::DbResult;

/// Counter kind for payment receipt numbers.
pub const KIND_RECEIPT: &str = "receipt";

/// Counter kind for return numbers.
pub const KIND_RETURN: &str = "return";

/// Atomically increments (creating if absent) the counter and returns the
/// new value. First call for a (account, kind) pair returns 1.
pub async fn next_number(
    conn: &mut SqliteConnection,
    account_id: &str,
    kind: &str,
) -> DbResult<i64> {
    let number: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO sequences (account_id, kind, last_number)
        VALUES (?1, ?2, 1)
        ON CONFLICT (account_id, kind)
        DO UPDATE SET last_number = last_number + 1
        RETURNING last_number
        "#,
    )
    .bind(account_id)
    .bind(kind)
    .fetch_one(conn)
    .await?;

    Ok(number)
}

/// Returns the counter kind for an invoice series.
pub fn invoice_kind(series: &str) -> String {
    format!("invoice:{series}")
}
