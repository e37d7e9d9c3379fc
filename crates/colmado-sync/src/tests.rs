//! End-to-end scenarios: pending queue → reconciler → real ledger.
//!
//! These exercise the full replay path against an in-memory back-office
//! database, including the client_ref dedup that makes crash-replay safe.

use chrono::Utc;
use tokio::sync::watch;

use colmado_core::{PaymentDraft, PaymentMethod, SaleDraft, SaleDraftItem, SaleType};
use colmado_db::{Database, DbConfig};

use crate::client::{LedgerApi, LocalLedgerClient};
use crate::queue::PendingQueue;
use crate::reconciler::SyncReconciler;

const ACCOUNT: &str = "acct-1";
const CASHIER: &str = "user-cashier";
const CUSTOMER: &str = "cust-1";
const PRODUCT_RICE: &str = "prod-rice";
const PRODUCT_OIL: &str = "prod-oil";

async fn seeded_db() -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let now = Utc::now();

    sqlx::query("INSERT INTO accounts (id, name, created_at) VALUES (?1, 'Colmado Doña Ana', ?2)")
        .bind(ACCOUNT)
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap();

    sqlx::query(
        r#"
        INSERT INTO users (id, account_id, username, name, is_admin,
                           can_cancel_payments, can_cancel_returns, is_active, created_at)
        VALUES (?1, ?2, 'pedro', 'pedro', 0, 0, 0, 1, ?3)
        "#,
    )
    .bind(CASHIER)
    .bind(ACCOUNT)
    .bind(now)
    .execute(db.pool())
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO customers (id, account_id, name, is_active, created_at) VALUES (?1, ?2, 'Juana Pérez', 1, ?3)",
    )
    .bind(CUSTOMER)
    .bind(ACCOUNT)
    .bind(now)
    .execute(db.pool())
    .await
    .unwrap();

    for (id, price_cents, stock) in [(PRODUCT_RICE, 5_900_i64, 100_i64), (PRODUCT_OIL, 11_800, 20)]
    {
        sqlx::query(
            r#"
            INSERT INTO products (id, account_id, sku, name, price_cents, stock,
                                  is_active, created_at, updated_at)
            VALUES (?1, ?2, ?1, ?1, ?3, ?4, 1, ?5, ?5)
            "#,
        )
        .bind(id)
        .bind(ACCOUNT)
        .bind(price_cents)
        .bind(stock)
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap();
    }

    db
}

async fn setup(
    online: bool,
) -> (
    Database,
    SyncReconciler<LocalLedgerClient>,
    watch::Sender<bool>,
) {
    let db = seeded_db().await;
    let queue = PendingQueue::in_memory().await.unwrap();
    let (online_tx, online_rx) = watch::channel(online);
    let reconciler = SyncReconciler::new(
        LocalLedgerClient::new(db.clone()),
        queue,
        ACCOUNT,
        CASHIER,
        online_rx,
    );
    (db, reconciler, online_tx)
}

fn rice_sale(qty: i64) -> SaleDraft {
    SaleDraft {
        customer_id: Some(CUSTOMER.to_string()),
        sale_type: SaleType::Credit,
        payment_method: None,
        items: vec![SaleDraftItem {
            product_id: PRODUCT_RICE.to_string(),
            qty,
            unit_price_cents: 5_900,
            was_price_overridden: false,
        }],
        shipping_cents: 0,
    }
}

async fn sale_count(db: &Database) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM sales")
        .fetch_one(db.pool())
        .await
        .unwrap()
}

async fn stock_of(db: &Database, product_id: &str) -> i64 {
    sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_one(db.pool())
        .await
        .unwrap()
}

/// (ar_id, total_cents, balance_cents, status) of the only AR row.
async fn only_ar(db: &Database) -> (String, i64, i64, String) {
    sqlx::query_as("SELECT id, total_cents, balance_cents, status FROM accounts_receivable")
        .fetch_one(db.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_offline_sale_and_payment_reach_the_ledger() {
    let (db, reconciler, online) = setup(false).await;

    reconciler.queue().enqueue_sale(&rice_sale(2)).await.unwrap();

    // Still offline: nothing reaches the ledger.
    reconciler.sync_pending().await.unwrap();
    assert_eq!(sale_count(&db).await, 0);

    online.send(true).unwrap();
    let report = reconciler.sync_pending().await.unwrap();
    assert_eq!(report.sales_synced, 1);
    assert!(report.is_clean());

    assert_eq!(sale_count(&db).await, 1);
    assert_eq!(stock_of(&db, PRODUCT_RICE).await, 98);

    let (ar_id, total, balance, status) = only_ar(&db).await;
    assert_eq!(total, 11_800);
    assert_eq!(balance, 11_800);
    assert_eq!(status, "pending");

    // The tab gets settled offline too.
    reconciler
        .queue()
        .enqueue_payment(&PaymentDraft {
            ar_id,
            amount_cents: 11_800,
            method: PaymentMethod::Cash,
            note: None,
        })
        .await
        .unwrap();

    let report = reconciler.sync_pending().await.unwrap();
    assert_eq!(report.payments_synced, 1);

    let (_, _, balance, status) = only_ar(&db).await;
    assert_eq!(balance, 0);
    assert_eq!(status, "paid");
    assert!(reconciler.queue().counts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_replay_after_crash_writes_the_ledger_once() {
    let (db, reconciler, _online) = setup(true).await;

    let entry = reconciler.queue().enqueue_sale(&rice_sale(2)).await.unwrap();

    // Simulate a crash between the ledger commit and the queue delete:
    // the ledger already holds this client_ref, the queue still holds
    // the entry.
    LocalLedgerClient::new(db.clone())
        .create_sale(ACCOUNT, CASHIER, &entry.draft, &entry.temp_id)
        .await
        .unwrap();
    assert_eq!(sale_count(&db).await, 1);
    assert_eq!(reconciler.queue().counts().await.unwrap().sales, 1);

    let report = reconciler.sync_pending().await.unwrap();
    assert_eq!(report.sales_synced, 1);

    // Dedup on client_ref: one sale, stock moved once.
    assert_eq!(sale_count(&db).await, 1);
    assert_eq!(stock_of(&db, PRODUCT_RICE).await, 98);
    assert!(reconciler.queue().counts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_entry_waits_for_a_later_pass() {
    let (db, reconciler, _online) = setup(true).await;

    // 25 units of a product with 20 in stock: the ledger refuses it.
    let oversold = SaleDraft {
        customer_id: Some(CUSTOMER.to_string()),
        sale_type: SaleType::Credit,
        payment_method: None,
        items: vec![SaleDraftItem {
            product_id: PRODUCT_OIL.to_string(),
            qty: 25,
            unit_price_cents: 11_800,
            was_price_overridden: false,
        }],
        shipping_cents: 0,
    };
    let bad = reconciler.queue().enqueue_sale(&oversold).await.unwrap();
    reconciler.queue().enqueue_sale(&rice_sale(1)).await.unwrap();

    let report = reconciler.sync_pending().await.unwrap();
    assert_eq!(report.sales_synced, 1);
    assert_eq!(report.failed, 1);

    assert_eq!(sale_count(&db).await, 1);
    let remaining = reconciler.queue().pending_sales().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].temp_id, bad.temp_id);

    // A delivery arrives; the stuck entry clears on the next pass.
    sqlx::query("UPDATE products SET stock = 30 WHERE id = ?1")
        .bind(PRODUCT_OIL)
        .execute(db.pool())
        .await
        .unwrap();

    let report = reconciler.sync_pending().await.unwrap();
    assert_eq!(report.sales_synced, 1);
    assert!(report.is_clean());
    assert_eq!(sale_count(&db).await, 2);
    assert!(reconciler.queue().counts().await.unwrap().is_empty());
}
