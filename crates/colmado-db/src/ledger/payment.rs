//! # Payment Lifecycle
//!
//! Recording and cancelling receipts against an AR.
//!
//! ## Amount Clamping
//! The applied amount is `min(requested, balance)`. A customer handing over
//! more than they owe gets the excess back as change at the counter; the
//! ledger never records an overpayment and the balance never goes negative.
//!
//! ## Cancellation
//! Requires the `can_cancel_payments` capability (or admin). The receipt
//! row survives with `cancelled_at`/`cancelled_by` set, and the AR balance
//! is recomputed from the remaining active payments - create-then-cancel
//! restores the prior balance exactly.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, info};
use uuid::Uuid;

use colmado_core::balance::{clamp_payment, recompute};
use colmado_core::validation::validate_payment_amount;
use colmado_core::{codes, ArStatus, LedgerError, LedgerResult, PaymentDraft, PaymentReceipt};

use crate::error::DbError;
use crate::ledger::{storage, Ledger};
use crate::repository::{ar, sequence};

#[derive(sqlx::FromRow)]
struct PaymentHead {
    id: String,
    ar_id: String,
    amount_cents: i64,
    receipt_code: String,
    cancelled_at: Option<chrono::DateTime<Utc>>,
}

impl Ledger {
    /// Records a payment against an AR in one transaction.
    ///
    /// ## Idempotency
    /// As with sales, `client_ref` makes replay safe: a payment already
    /// recorded under the same (account, client_ref) is returned as-is
    /// instead of being applied twice.
    pub async fn create_payment(
        &self,
        account_id: &str,
        user_id: &str,
        draft: &PaymentDraft,
        client_ref: Option<&str>,
    ) -> LedgerResult<PaymentReceipt> {
        validate_payment_amount(draft.amount_cents)?;

        let mut tx = self.pool().begin().await.map_err(storage)?;

        let actor = self.resolve_actor(&mut tx, account_id, user_id).await?;

        if let Some(cref) = client_ref {
            if let Some(existing) = find_by_client_ref(&mut tx, account_id, cref).await? {
                debug!(client_ref = cref, payment_id = %existing.payment_id, "Payment replay, returning original");
                return Ok(existing);
            }
        }

        let ar_row = ar::get_scoped(&mut tx, account_id, &draft.ar_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Account receivable", &draft.ar_id))?;

        if ar_row.status == ArStatus::Paid {
            return Err(LedgerError::AlreadySettled {
                ar_id: draft.ar_id.clone(),
            });
        }

        let applied_cents = clamp_payment(draft.amount_cents, ar_row.balance_cents);

        let number = sequence::next_number(&mut tx, account_id, sequence::KIND_RECEIPT).await?;
        let receipt_code = codes::receipt_code(number);

        let payment_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let inserted = sqlx::query(
            r#"
            INSERT INTO payments (
                id, account_id, ar_id, user_id, amount_cents, method, note,
                receipt_number, receipt_code, client_ref, paid_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&payment_id)
        .bind(account_id)
        .bind(&draft.ar_id)
        .bind(user_id)
        .bind(applied_cents)
        .bind(draft.method)
        .bind(&draft.note)
        .bind(number)
        .bind(&receipt_code)
        .bind(client_ref)
        .bind(now)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
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

        // Recompute from the full active set, never by decrementing in place
        let payments = ar::active_payment_amounts(&mut tx, &draft.ar_id).await?;
        let returns = ar::active_return_total(&mut tx, &ar_row.sale_id).await?;
        let balance = recompute(ar_row.total_cents, &payments, returns);

        ar::update_balance(&mut tx, &draft.ar_id, balance.balance_cents, balance.status).await?;

        tx.commit().await.map_err(storage)?;

        info!(
            payment_id = %payment_id,
            receipt_code = %receipt_code,
            applied_cents = applied_cents,
            new_balance_cents = balance.balance_cents,
            "Payment recorded"
        );

        self.audit(
            account_id,
            &actor.user_id,
            "payment.create",
            "payment",
            &payment_id,
            serde_json::json!({
                "receipt_code": receipt_code,
                "ar_id": draft.ar_id,
                "requested_cents": draft.amount_cents,
                "applied_cents": applied_cents,
            }),
        )
        .await;

        Ok(PaymentReceipt {
            payment_id,
            receipt_code,
            applied_cents,
            new_balance_cents: balance.balance_cents,
        })
    }

    /// Cancels a payment and restores the AR balance.
    pub async fn cancel_payment(
        &self,
        account_id: &str,
        user_id: &str,
        payment_id: &str,
    ) -> LedgerResult<()> {
        let mut tx = self.pool().begin().await.map_err(storage)?;

        let actor = self.resolve_actor(&mut tx, account_id, user_id).await?;
        if !actor.may_cancel_payments() {
            return Err(LedgerError::Forbidden {
                action: "cancel payments",
            });
        }

        let payment = sqlx::query_as::<_, PaymentHead>(
            r#"
            SELECT id, ar_id, amount_cents, receipt_code, cancelled_at
            FROM payments
            WHERE id = ?1 AND account_id = ?2
            "#,
        )
        .bind(payment_id)
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?
        .ok_or_else(|| LedgerError::not_found("Payment", payment_id))?;

        if payment.cancelled_at.is_some() {
            return Err(LedgerError::AlreadyCancelled {
                entity: "Payment",
                id: payment_id.to_string(),
            });
        }

        let ar_row = ar::get_scoped(&mut tx, account_id, &payment.ar_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Account receivable", &payment.ar_id))?;

        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE payments SET cancelled_at = ?2, cancelled_by = ?3
            WHERE id = ?1
            "#,
        )
        .bind(payment_id)
        .bind(now)
        .bind(&actor.user_id)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        // The cancelled row no longer matches the active filter
        let payments = ar::active_payment_amounts(&mut tx, &payment.ar_id).await?;
        let returns = ar::active_return_total(&mut tx, &ar_row.sale_id).await?;
        let balance = recompute(ar_row.total_cents, &payments, returns);

        ar::update_balance(&mut tx, &payment.ar_id, balance.balance_cents, balance.status).await?;

        tx.commit().await.map_err(storage)?;

        info!(
            payment_id = %payment_id,
            receipt_code = %payment.receipt_code,
            restored_balance_cents = balance.balance_cents,
            "Payment cancelled"
        );

        self.audit(
            account_id,
            &actor.user_id,
            "payment.cancel",
            "payment",
            payment_id,
            serde_json::json!({
                "receipt_code": payment.receipt_code,
                "amount_cents": payment.amount_cents,
            }),
        )
        .await;

        Ok(())
    }
}

/// Looks up a previously recorded payment by its replay key, reporting the
/// originally applied amount and the AR's current balance.
async fn find_by_client_ref(
    conn: &mut SqliteConnection,
    account_id: &str,
    client_ref: &str,
) -> LedgerResult<Option<PaymentReceipt>> {
    let head = sqlx::query_as::<_, PaymentHead>(
        r#"
        SELECT id, ar_id, amount_cents, receipt_code, cancelled_at
        FROM payments
        WHERE account_id = ?1 AND client_ref = ?2
        "#,
    )
    .bind(account_id)
    .bind(client_ref)
    .fetch_optional(&mut *conn)
    .await
    .map_err(storage)?;

    let head = match head {
        Some(h) => h,
        None => return Ok(None),
    };

    let balance_cents: i64 = sqlx::query_scalar(
        r#"
        SELECT balance_cents FROM accounts_receivable WHERE id = ?1
        "#,
    )
    .bind(&head.ar_id)
    .fetch_one(conn)
    .await
    .map_err(storage)?;

    Ok(Some(PaymentReceipt {
        payment_id: head.id,
        receipt_code: head.receipt_code,
        applied_cents: head.amount_cents,
        new_balance_cents: balance_cents,
    }))
}
