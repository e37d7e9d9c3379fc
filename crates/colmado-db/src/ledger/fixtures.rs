//! Shared test fixtures: an in-memory database seeded with one account,
//! three users (admin, plain cashier, cashier with cancel capabilities),
//! one customer, and two stocked products.

use chrono::Utc;
use sqlx::SqlitePool;

use colmado_core::{PaymentMethod, SaleDraft, SaleDraftItem, SaleType};

use crate::pool::{Database, DbConfig};

pub const ACCOUNT: &str = "acct-1";
pub const OTHER_ACCOUNT: &str = "acct-2";
pub const ADMIN: &str = "user-admin";
pub const CASHIER: &str = "user-cashier";
pub const SUPERVISOR: &str = "user-supervisor";
pub const OTHER_USER: &str = "user-other";
pub const CUSTOMER: &str = "cust-1";
pub const PRODUCT_RICE: &str = "prod-rice";
pub const PRODUCT_OIL: &str = "prod-oil";

pub async fn seeded_db() -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    seed(db.pool()).await;
    db
}

async fn insert_account(pool: &SqlitePool, id: &str, name: &str) {
    sqlx::query("INSERT INTO accounts (id, name, created_at) VALUES (?1, ?2, ?3)")
        .bind(id)
        .bind(name)
        .bind(Utc::now())
        .execute(pool)
        .await
        .unwrap();
}

#[allow(clippy::too_many_arguments)]
async fn insert_user(
    pool: &SqlitePool,
    id: &str,
    account_id: &str,
    username: &str,
    is_admin: bool,
    can_cancel_payments: bool,
    can_cancel_returns: bool,
    is_active: bool,
) {
    sqlx::query(
        r#"
        INSERT INTO users (id, account_id, username, name, is_admin,
                           can_cancel_payments, can_cancel_returns, is_active, created_at)
        VALUES (?1, ?2, ?3, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(id)
    .bind(account_id)
    .bind(username)
    .bind(is_admin)
    .bind(can_cancel_payments)
    .bind(can_cancel_returns)
    .bind(is_active)
    .bind(Utc::now())
    .execute(pool)
    .await
    .unwrap();
}

async fn insert_product(pool: &SqlitePool, id: &str, account_id: &str, price_cents: i64, stock: i64) {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO products (id, account_id, sku, name, price_cents, stock,
                              is_active, created_at, updated_at)
        VALUES (?1, ?2, ?1, ?1, ?3, ?4, 1, ?5, ?5)
        "#,
    )
    .bind(id)
    .bind(account_id)
    .bind(price_cents)
    .bind(stock)
    .bind(now)
    .execute(pool)
    .await
    .unwrap();
}

async fn seed(pool: &SqlitePool) {
    insert_account(pool, ACCOUNT, "Colmado Doña Ana").await;
    insert_account(pool, OTHER_ACCOUNT, "Colmado El Primo").await;

    insert_user(pool, ADMIN, ACCOUNT, "ana", true, false, false, true).await;
    insert_user(pool, CASHIER, ACCOUNT, "pedro", false, false, false, true).await;
    insert_user(pool, SUPERVISOR, ACCOUNT, "maria", false, true, true, true).await;
    insert_user(pool, OTHER_USER, OTHER_ACCOUNT, "luis", true, true, true, true).await;

    sqlx::query(
        "INSERT INTO customers (id, account_id, name, is_active, created_at) VALUES (?1, ?2, ?3, 1, ?4)",
    )
    .bind(CUSTOMER)
    .bind(ACCOUNT)
    .bind("Juana Pérez")
    .bind(Utc::now())
    .execute(pool)
    .await
    .unwrap();

    insert_product(pool, PRODUCT_RICE, ACCOUNT, 5_900, 100).await;
    insert_product(pool, PRODUCT_OIL, ACCOUNT, 11_800, 20).await;
}

pub fn credit_draft(items: Vec<SaleDraftItem>) -> SaleDraft {
    SaleDraft {
        customer_id: Some(CUSTOMER.to_string()),
        sale_type: SaleType::Credit,
        payment_method: None,
        items,
        shipping_cents: 0,
    }
}

pub fn cash_draft(items: Vec<SaleDraftItem>) -> SaleDraft {
    SaleDraft {
        customer_id: None,
        sale_type: SaleType::Cash,
        payment_method: Some(PaymentMethod::Cash),
        items,
        shipping_cents: 0,
    }
}

pub fn line(product_id: &str, qty: i64, unit_price_cents: i64) -> SaleDraftItem {
    SaleDraftItem {
        product_id: product_id.to_string(),
        qty,
        unit_price_cents,
        was_price_overridden: false,
    }
}

/// Current stock of a product.
pub async fn stock_of(pool: &SqlitePool, product_id: &str) -> i64 {
    sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// The AR row attached to a sale.
pub async fn ar_of_sale(pool: &SqlitePool, sale_id: &str) -> colmado_core::AccountReceivable {
    sqlx::query_as(
        r#"
        SELECT id, sale_id, customer_id, total_cents, balance_cents,
               status, created_at, updated_at
        FROM accounts_receivable WHERE sale_id = ?1
        "#,
    )
    .bind(sale_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Sale items of a sale, for building return requests.
pub async fn items_of_sale(pool: &SqlitePool, sale_id: &str) -> Vec<colmado_core::SaleItem> {
    sqlx::query_as(
        r#"
        SELECT id, sale_id, product_id, qty, unit_price_cents,
               line_total_cents, was_price_overridden
        FROM sale_items WHERE sale_id = ?1
        "#,
    )
    .bind(sale_id)
    .fetch_all(pool)
    .await
    .unwrap()
}
