//! # Accounts-Receivable Queries
//!
//! Reads and writes for AR rows, used inside payment/return lifecycle
//! transactions. Account scoping always goes through the owning sale:
//! `accounts_receivable` carries no account_id of its own, so a join on
//! `sales.account_id` is the single scoping path.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use colmado_core::{AccountReceivable, ArStatus, PaymentMethod};

use crate::error::DbResult;

/// Default page size for the open-AR listing.
const DEFAULT_PAGE_SIZE: i64 = 50;

/// Filters for the open-AR listing.
#[derive(Debug, Clone, Default)]
pub struct OpenArQuery {
    /// Substring match against customer name or invoice code.
    pub search: Option<String>,

    /// Rows to skip (paging offset).
    pub skip: i64,

    /// Page size; values <= 0 fall back to [`DEFAULT_PAGE_SIZE`].
    pub take: i64,
}

/// An active payment shown inline on an open-AR row.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct ArPaymentSummary {
    pub id: String,
    pub receipt_code: String,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub paid_at: DateTime<Utc>,
}

/// One row of the open-AR listing, joined with customer and invoice data
/// for display.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct OpenArEntry {
    pub id: String,
    pub sale_id: String,
    pub invoice_code: String,
    pub customer_id: String,
    pub customer_name: String,
    pub total_cents: i64,
    pub balance_cents: i64,
    pub status: ArStatus,
    pub created_at: DateTime<Utc>,

    /// Active payments against this AR, oldest first. Filled after the
    /// main fetch.
    #[sqlx(skip)]
    pub payments: Vec<ArPaymentSummary>,
}

/// Fetches an AR by id, scoped to the account through its sale.
///
/// Returns `None` both when the id is unknown and when the AR belongs to
/// another account.
pub async fn get_scoped(
    conn: &mut SqliteConnection,
    account_id: &str,
    ar_id: &str,
) -> DbResult<Option<AccountReceivable>> {
    let ar = sqlx::query_as::<_, AccountReceivable>(
        r#"
        SELECT ar.id, ar.sale_id, ar.customer_id, ar.total_cents,
               ar.balance_cents, ar.status, ar.created_at, ar.updated_at
        FROM accounts_receivable ar
        JOIN sales s ON s.id = ar.sale_id
        WHERE ar.id = ?1 AND s.account_id = ?2
        "#,
    )
    .bind(ar_id)
    .bind(account_id)
    .fetch_optional(conn)
    .await?;

    Ok(ar)
}

/// Fetches the AR attached to a sale, if any (cash sales have none).
pub async fn get_by_sale(
    conn: &mut SqliteConnection,
    sale_id: &str,
) -> DbResult<Option<AccountReceivable>> {
    let ar = sqlx::query_as::<_, AccountReceivable>(
        r#"
        SELECT id, sale_id, customer_id, total_cents,
               balance_cents, status, created_at, updated_at
        FROM accounts_receivable
        WHERE sale_id = ?1
        "#,
    )
    .bind(sale_id)
    .fetch_optional(conn)
    .await?;

    Ok(ar)
}

/// Active (non-cancelled) payment amounts against an AR, oldest first.
pub async fn active_payment_amounts(
    conn: &mut SqliteConnection,
    ar_id: &str,
) -> DbResult<Vec<i64>> {
    let amounts: Vec<i64> = sqlx::query_scalar(
        r#"
        SELECT amount_cents
        FROM payments
        WHERE ar_id = ?1 AND cancelled_at IS NULL
        ORDER BY paid_at
        "#,
    )
    .bind(ar_id)
    .fetch_all(conn)
    .await?;

    Ok(amounts)
}

/// Count of active payments against an AR (cancel-sale guard).
pub async fn active_payment_count(conn: &mut SqliteConnection, ar_id: &str) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM payments
        WHERE ar_id = ?1 AND cancelled_at IS NULL
        "#,
    )
    .bind(ar_id)
    .fetch_one(conn)
    .await?;

    Ok(count)
}

/// Total of active (non-cancelled) returns against a sale.
pub async fn active_return_total(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<i64> {
    let total: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT SUM(total_cents)
        FROM returns
        WHERE sale_id = ?1 AND cancelled_at IS NULL
        "#,
    )
    .bind(sale_id)
    .fetch_one(conn)
    .await?;

    Ok(total.unwrap_or(0))
}

/// Writes a recomputed balance and status back to the AR row.
pub async fn update_balance(
    conn: &mut SqliteConnection,
    ar_id: &str,
    balance_cents: i64,
    status: ArStatus,
) -> DbResult<()> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE accounts_receivable
        SET balance_cents = ?2, status = ?3, updated_at = ?4
        WHERE id = ?1
        "#,
    )
    .bind(ar_id)
    .bind(balance_cents)
    .bind(status)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(())
}

/// Lists open ARs (status != paid) for an account, oldest first, with
/// their active payments embedded.
///
/// Excludes ARs whose sale was cancelled; those are closed history even if
/// the row still carries a balance snapshot.
pub async fn list_open(
    pool: &SqlitePool,
    account_id: &str,
    query: &OpenArQuery,
) -> DbResult<Vec<OpenArEntry>> {
    let pattern = match query.search.as_deref() {
        Some(s) => format!("%{}%", s),
        None => "%".to_string(),
    };
    let take = if query.take > 0 {
        query.take
    } else {
        DEFAULT_PAGE_SIZE
    };

    let mut entries = sqlx::query_as::<_, OpenArEntry>(
        r#"
        SELECT ar.id, ar.sale_id, s.invoice_code, ar.customer_id,
               c.name AS customer_name, ar.total_cents, ar.balance_cents,
               ar.status, ar.created_at
        FROM accounts_receivable ar
        JOIN sales s ON s.id = ar.sale_id
        JOIN customers c ON c.id = ar.customer_id
        WHERE s.account_id = ?1
          AND s.cancelled_at IS NULL
          AND ar.status != 'paid'
          AND (c.name LIKE ?2 OR s.invoice_code LIKE ?2)
        ORDER BY ar.created_at
        LIMIT ?3 OFFSET ?4
        "#,
    )
    .bind(account_id)
    .bind(&pattern)
    .bind(take)
    .bind(query.skip.max(0))
    .fetch_all(pool)
    .await?;

    // One page is at most DEFAULT_PAGE_SIZE rows, so per-row payment
    // fetches stay cheap.
    for entry in &mut entries {
        entry.payments = sqlx::query_as::<_, ArPaymentSummary>(
            r#"
            SELECT id, receipt_code, amount_cents, method, paid_at
            FROM payments
            WHERE ar_id = ?1 AND cancelled_at IS NULL
            ORDER BY paid_at
            "#,
        )
        .bind(&entry.id)
        .fetch_all(pool)
        .await?;
    }

    Ok(entries)
}
