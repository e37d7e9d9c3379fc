//! # Sale Lifecycle
//!
//! Creating and cancelling invoices.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       create_sale                                       │
//! │                                                                         │
//! │  validate draft (non-empty, qty > 0)                                   │
//! │       │                                                                 │
//! │  BEGIN                                                                  │
//! │       ├── resolve actor                                                 │
//! │       ├── client_ref already recorded? → return original receipt       │
//! │       ├── check products (active, stock unless negatives allowed)      │
//! │       ├── consume invoice counter → A-00042                            │
//! │       ├── split tax out of the items total (prices are tax-inclusive)  │
//! │       ├── INSERT sale + items, decrement stock                         │
//! │       └── credit? INSERT AR (balance = total, status = pending)        │
//! │  COMMIT                                                                 │
//! │       │                                                                 │
//! │  audit("sale.create")                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cancellation is refused while a credit sale has active payments: cancel
//! the payments first, then the sale. Stock restored on cancel is the full
//! sold quantity.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, info};
use uuid::Uuid;

use colmado_core::validation::validate_sale_draft;
use colmado_core::{
    codes, ArStatus, LedgerError, LedgerResult, Money, SaleDraft, SaleReceipt, SaleType,
    DEFAULT_INVOICE_SERIES,
};

use crate::error::DbError;
use crate::ledger::{storage, Ledger};
use crate::repository::{ar, sequence};

#[derive(sqlx::FromRow)]
struct ProductRow {
    stock: i64,
    is_active: bool,
}

#[derive(sqlx::FromRow)]
struct SaleHead {
    id: String,
    invoice_code: String,
    sale_type: SaleType,
    cancelled_at: Option<chrono::DateTime<Utc>>,
}

impl Ledger {
    /// Creates a sale (and, for credit sales, its AR) in one transaction.
    ///
    /// ## Idempotency
    /// `client_ref` is the client-generated replay key. When a sale with
    /// the same (account, client_ref) already exists, the original receipt
    /// is returned and nothing is written - the offline queue can re-send
    /// a draft any number of times.
    pub async fn create_sale(
        &self,
        account_id: &str,
        user_id: &str,
        draft: &SaleDraft,
        client_ref: Option<&str>,
    ) -> LedgerResult<SaleReceipt> {
        let items_total = validate_sale_draft(draft)?;

        if draft.sale_type == SaleType::Credit && draft.customer_id.is_none() {
            return Err(LedgerError::CustomerRequired);
        }

        let mut tx = self.pool().begin().await.map_err(storage)?;

        let actor = self.resolve_actor(&mut tx, account_id, user_id).await?;

        // Idempotent replay: the draft was already recorded
        if let Some(cref) = client_ref {
            if let Some(existing) = find_by_client_ref(&mut tx, account_id, cref).await? {
                debug!(client_ref = cref, sale_id = %existing.sale_id, "Sale replay, returning original");
                return Ok(existing);
            }
        }

        let settings = self.settings(&mut tx, account_id).await?;

        // Products must exist in this account and be active; stock is
        // checked per line unless the account allows negatives
        for item in &draft.items {
            let product = sqlx::query_as::<_, ProductRow>(
                r#"
                SELECT stock, is_active FROM products
                WHERE id = ?1 AND account_id = ?2
                "#,
            )
            .bind(&item.product_id)
            .bind(account_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage)?;

            let product = match product {
                Some(p) if p.is_active => p,
                _ => return Err(LedgerError::not_found("Product", &item.product_id)),
            };

            if !settings.allow_negative_stock && product.stock < item.qty {
                return Err(LedgerError::InsufficientStock {
                    product_id: item.product_id.clone(),
                    available: product.stock,
                    requested: item.qty,
                });
            }
        }

        let number = sequence::next_number(
            &mut tx,
            account_id,
            &sequence::invoice_kind(DEFAULT_INVOICE_SERIES),
        )
        .await?;
        let invoice_code = codes::invoice_code(DEFAULT_INVOICE_SERIES, number);

        // Shelf prices are tax-inclusive; the split only reports the ITBIS
        // share on the document, it never changes what the customer owes
        let split = Money::from_cents(items_total).split_tax_included(settings.tax_rate);
        let total_cents = items_total + draft.shipping_cents;

        let sale_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let inserted = sqlx::query(
            r#"
            INSERT INTO sales (
                id, account_id, invoice_series, invoice_number, invoice_code,
                sale_type, payment_method, customer_id, user_id,
                subtotal_cents, tax_cents, shipping_cents, total_cents,
                client_ref, sold_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&sale_id)
        .bind(account_id)
        .bind(DEFAULT_INVOICE_SERIES)
        .bind(number)
        .bind(&invoice_code)
        .bind(draft.sale_type)
        .bind(draft.payment_method)
        .bind(&draft.customer_id)
        .bind(user_id)
        .bind(split.subtotal_cents)
        .bind(split.tax_cents)
        .bind(draft.shipping_cents)
        .bind(total_cents)
        .bind(client_ref)
        .bind(now)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            // Two deliveries of the same draft racing each other: the loser
            // hits the (account_id, client_ref) unique index. Surface the
            // winner's receipt.
            let db_err = DbError::from(e);
            if let Some(cref) = client_ref {
                if db_err.is_unique_violation_on("client_ref") {
                    drop(tx);
                    let mut conn = self.pool().acquire().await.map_err(storage)?;
                    if let Some(existing) = find_by_client_ref(&mut conn, account_id, cref).await? {
                        return Ok(existing);
                    }
                }
            }
            return Err(db_err.into());
        }

        for item in &draft.items {
            let item_id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, qty, unit_price_cents,
                    line_total_cents, was_price_overridden
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item_id)
            .bind(&sale_id)
            .bind(&item.product_id)
            .bind(item.qty)
            .bind(item.unit_price_cents)
            .bind(item.unit_price_cents * item.qty)
            .bind(item.was_price_overridden)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

            sqlx::query(
                r#"
                UPDATE products SET stock = stock - ?2, updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(&item.product_id)
            .bind(item.qty)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        }

        if draft.sale_type == SaleType::Credit {
            let ar_id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO accounts_receivable (
                    id, sale_id, customer_id, total_cents, balance_cents,
                    status, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&ar_id)
            .bind(&sale_id)
            .bind(&draft.customer_id)
            .bind(total_cents)
            .bind(total_cents)
            .bind(ArStatus::Pending)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        }

        tx.commit().await.map_err(storage)?;

        info!(
            sale_id = %sale_id,
            invoice_code = %invoice_code,
            total_cents = total_cents,
            "Sale created"
        );

        self.audit(
            account_id,
            &actor.user_id,
            "sale.create",
            "sale",
            &sale_id,
            serde_json::json!({
                "invoice_code": invoice_code,
                "sale_type": draft.sale_type,
                "total_cents": total_cents,
            }),
        )
        .await;

        Ok(SaleReceipt {
            sale_id,
            invoice_code,
            sale_type: draft.sale_type,
        })
    }

    /// Cancels a sale, restoring the sold stock.
    ///
    /// A credit sale with active payments is refused
    /// (`HasActivePayments`): cancel the payments first so the cash trail
    /// stays explicit.
    pub async fn cancel_sale(
        &self,
        account_id: &str,
        user_id: &str,
        sale_id: &str,
    ) -> LedgerResult<()> {
        let mut tx = self.pool().begin().await.map_err(storage)?;

        let actor = self.resolve_actor(&mut tx, account_id, user_id).await?;

        let sale = sqlx::query_as::<_, SaleHead>(
            r#"
            SELECT id, invoice_code, sale_type, cancelled_at
            FROM sales
            WHERE id = ?1 AND account_id = ?2
            "#,
        )
        .bind(sale_id)
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?
        .ok_or_else(|| LedgerError::not_found("Sale", sale_id))?;

        if sale.cancelled_at.is_some() {
            return Err(LedgerError::AlreadyCancelled {
                entity: "Sale",
                id: sale_id.to_string(),
            });
        }

        if let Some(ar_row) = ar::get_by_sale(&mut tx, sale_id).await? {
            if ar::active_payment_count(&mut tx, &ar_row.id).await? > 0 {
                return Err(LedgerError::HasActivePayments {
                    sale_id: sale_id.to_string(),
                });
            }
        }

        let now = Utc::now();

        // Put the sold quantities back on the shelf
        sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + (
                    SELECT SUM(si.qty) FROM sale_items si
                    WHERE si.sale_id = ?1 AND si.product_id = products.id
                ),
                updated_at = ?2
            WHERE id IN (SELECT product_id FROM sale_items WHERE sale_id = ?1)
            "#,
        )
        .bind(sale_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        sqlx::query(
            r#"
            UPDATE sales SET cancelled_at = ?2, cancelled_by = ?3
            WHERE id = ?1
            "#,
        )
        .bind(sale_id)
        .bind(now)
        .bind(&actor.user_id)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        tx.commit().await.map_err(storage)?;

        info!(sale_id = %sale_id, invoice_code = %sale.invoice_code, "Sale cancelled");

        self.audit(
            account_id,
            &actor.user_id,
            "sale.cancel",
            "sale",
            sale_id,
            serde_json::json!({ "invoice_code": sale.invoice_code }),
        )
        .await;

        Ok(())
    }
}

/// Looks up a previously recorded sale by its replay key.
async fn find_by_client_ref(
    conn: &mut SqliteConnection,
    account_id: &str,
    client_ref: &str,
) -> LedgerResult<Option<SaleReceipt>> {
    let head = sqlx::query_as::<_, SaleHead>(
        r#"
        SELECT id, invoice_code, sale_type, cancelled_at
        FROM sales
        WHERE account_id = ?1 AND client_ref = ?2
        "#,
    )
    .bind(account_id)
    .bind(client_ref)
    .fetch_optional(conn)
    .await
    .map_err(storage)?;

    Ok(head.map(|h| SaleReceipt {
        sale_id: h.id,
        invoice_code: h.invoice_code,
        sale_type: h.sale_type,
    }))
}
