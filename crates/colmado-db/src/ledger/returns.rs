//! # Return Lifecycle
//!
//! Taking merchandise back and reversing it.
//!
//! ## Quantity Bound
//! For every sale item, cumulative active returned qty never exceeds the
//! sold qty. The bound is enforced against the rows visible inside the
//! transaction, counting only non-cancelled returns - a cancelled return
//! hands its quantity back.
//!
//! ## AR Interaction
//! Returns against a credit sale reduce the AR balance through the balance
//! engine, same as payments. Returns against cash sales only move stock;
//! cash refunds happen at the counter, outside the ledger.

use std::collections::HashMap;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use colmado_core::balance::recompute;
use colmado_core::validation::validate_return_items;
use colmado_core::{
    codes, LedgerError, LedgerResult, Money, ReturnReceipt, ReturnRequestItem, SaleItem,
};

use crate::ledger::{storage, Ledger};
use crate::repository::{ar, sequence};

#[derive(sqlx::FromRow)]
struct ReturnHead {
    sale_id: String,
    return_code: String,
    total_cents: i64,
    cancelled_at: Option<chrono::DateTime<Utc>>,
}

impl Ledger {
    /// Creates a return against a sale in one transaction.
    pub async fn create_return(
        &self,
        account_id: &str,
        user_id: &str,
        sale_id: &str,
        items: &[ReturnRequestItem],
        notes: Option<&str>,
    ) -> LedgerResult<ReturnReceipt> {
        let mut tx = self.pool().begin().await.map_err(storage)?;

        let actor = self.resolve_actor(&mut tx, account_id, user_id).await?;

        let sale: Option<(String, Option<chrono::DateTime<Utc>>)> = sqlx::query_as(
            r#"
            SELECT id, cancelled_at FROM sales
            WHERE id = ?1 AND account_id = ?2
            "#,
        )
        .bind(sale_id)
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?;

        let (_, cancelled_at) = sale.ok_or_else(|| LedgerError::not_found("Sale", sale_id))?;
        if cancelled_at.is_some() {
            return Err(LedgerError::SaleCancelled {
                sale_id: sale_id.to_string(),
            });
        }

        let sale_items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, qty, unit_price_cents,
                   line_total_cents, was_price_overridden
            FROM sale_items
            WHERE sale_id = ?1
            "#,
        )
        .bind(sale_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(storage)?;

        // Quantities consumed by earlier, still-active returns
        let returned_rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT ri.sale_item_id, SUM(ri.qty)
            FROM return_items ri
            JOIN returns r ON r.id = ri.return_id
            WHERE r.sale_id = ?1 AND r.cancelled_at IS NULL
            GROUP BY ri.sale_item_id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(storage)?;
        let already_returned: HashMap<String, i64> = returned_rows.into_iter().collect();

        let total_cents = validate_return_items(&sale_items, &already_returned, items)?;

        let settings = self.settings(&mut tx, account_id).await?;
        let split = Money::from_cents(total_cents).split_tax_included(settings.tax_rate);

        let number = sequence::next_number(&mut tx, account_id, sequence::KIND_RETURN).await?;
        let return_code = codes::return_code(number);

        let return_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO returns (
                id, account_id, sale_id, user_id, return_number, return_code,
                subtotal_cents, tax_cents, total_cents, notes, returned_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&return_id)
        .bind(account_id)
        .bind(sale_id)
        .bind(user_id)
        .bind(number)
        .bind(&return_code)
        .bind(split.subtotal_cents)
        .bind(split.tax_cents)
        .bind(total_cents)
        .bind(notes)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        for item in items {
            let item_id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO return_items (
                    id, return_id, sale_item_id, product_id, qty,
                    unit_price_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item_id)
            .bind(&return_id)
            .bind(&item.sale_item_id)
            .bind(&item.product_id)
            .bind(item.qty)
            .bind(item.unit_price_cents)
            .bind(item.unit_price_cents * item.qty)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

            // Returned goods go back on the shelf
            sqlx::query(
                r#"
                UPDATE products SET stock = stock + ?2, updated_at = ?3
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

        if let Some(ar_row) = ar::get_by_sale(&mut tx, sale_id).await? {
            let payments = ar::active_payment_amounts(&mut tx, &ar_row.id).await?;
            let returns = ar::active_return_total(&mut tx, sale_id).await?;
            let balance = recompute(ar_row.total_cents, &payments, returns);
            ar::update_balance(&mut tx, &ar_row.id, balance.balance_cents, balance.status).await?;
        }

        tx.commit().await.map_err(storage)?;

        info!(
            return_id = %return_id,
            return_code = %return_code,
            total_cents = total_cents,
            "Return created"
        );

        self.audit(
            account_id,
            &actor.user_id,
            "return.create",
            "return",
            &return_id,
            serde_json::json!({
                "return_code": return_code,
                "sale_id": sale_id,
                "total_cents": total_cents,
            }),
        )
        .await;

        Ok(ReturnReceipt {
            return_id,
            return_code,
        })
    }

    /// Cancels a return: stock comes back off the shelf and the quantities
    /// become returnable again.
    pub async fn cancel_return(
        &self,
        account_id: &str,
        user_id: &str,
        return_id: &str,
    ) -> LedgerResult<()> {
        let mut tx = self.pool().begin().await.map_err(storage)?;

        let actor = self.resolve_actor(&mut tx, account_id, user_id).await?;
        if !actor.may_cancel_returns() {
            return Err(LedgerError::Forbidden {
                action: "cancel returns",
            });
        }

        let ret = sqlx::query_as::<_, ReturnHead>(
            r#"
            SELECT sale_id, return_code, total_cents, cancelled_at
            FROM returns
            WHERE id = ?1 AND account_id = ?2
            "#,
        )
        .bind(return_id)
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?
        .ok_or_else(|| LedgerError::not_found("Return", return_id))?;

        if ret.cancelled_at.is_some() {
            return Err(LedgerError::AlreadyCancelled {
                entity: "Return",
                id: return_id.to_string(),
            });
        }

        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE returns SET cancelled_at = ?2, cancelled_by = ?3
            WHERE id = ?1
            "#,
        )
        .bind(return_id)
        .bind(now)
        .bind(&actor.user_id)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        // The goods were re-shelved when the return was taken; undo that
        sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - (
                    SELECT SUM(ri.qty) FROM return_items ri
                    WHERE ri.return_id = ?1 AND ri.product_id = products.id
                ),
                updated_at = ?2
            WHERE id IN (SELECT product_id FROM return_items WHERE return_id = ?1)
            "#,
        )
        .bind(return_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        if let Some(ar_row) = ar::get_by_sale(&mut tx, &ret.sale_id).await? {
            let payments = ar::active_payment_amounts(&mut tx, &ar_row.id).await?;
            let returns = ar::active_return_total(&mut tx, &ret.sale_id).await?;
            let balance = recompute(ar_row.total_cents, &payments, returns);
            ar::update_balance(&mut tx, &ar_row.id, balance.balance_cents, balance.status).await?;
        }

        tx.commit().await.map_err(storage)?;

        info!(
            return_id = %return_id,
            return_code = %ret.return_code,
            total_cents = ret.total_cents,
            "Return cancelled"
        );

        self.audit(
            account_id,
            &actor.user_id,
            "return.cancel",
            "return",
            return_id,
            serde_json::json!({
                "return_code": ret.return_code,
                "total_cents": ret.total_cents,
            }),
        )
        .await;

        Ok(())
    }
}
