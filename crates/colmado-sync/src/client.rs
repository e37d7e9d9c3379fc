//! # Ledger Client
//!
//! The seam between the reconciler and the authoritative ledger.
//!
//! The reconciler only needs two operations - "record this sale" and
//! "record this payment", both keyed by a client reference - so that is
//! the whole trait. Tests substitute a scripted implementation; production
//! wires in [`LocalLedgerClient`] over the back-office database.

use colmado_core::{LedgerResult, PaymentDraft, PaymentReceipt, SaleDraft, SaleReceipt};
use colmado_db::Database;

// =============================================================================
// LedgerApi
// =============================================================================

/// What the reconciler requires of the ledger.
///
/// Implementations MUST be idempotent in `client_ref`: replaying the same
/// reference twice returns the first outcome instead of writing twice. The
/// ledger guarantees this via its unique `(account_id, client_ref)` index.
#[allow(async_fn_in_trait)]
pub trait LedgerApi {
    /// Records a sale, using `client_ref` as the idempotency key.
    async fn create_sale(
        &self,
        account_id: &str,
        user_id: &str,
        draft: &SaleDraft,
        client_ref: &str,
    ) -> LedgerResult<SaleReceipt>;

    /// Records a payment, using `client_ref` as the idempotency key.
    async fn create_payment(
        &self,
        account_id: &str,
        user_id: &str,
        draft: &PaymentDraft,
        client_ref: &str,
    ) -> LedgerResult<PaymentReceipt>;
}

// =============================================================================
// LocalLedgerClient
// =============================================================================

/// [`LedgerApi`] over the back-office database on this machine.
///
/// The common deployment: queue and ledger share a host, and "offline"
/// means the POS frontend lost its connection to the back office process,
/// not that the database is gone.
#[derive(Debug, Clone)]
pub struct LocalLedgerClient {
    db: Database,
}

impl LocalLedgerClient {
    pub fn new(db: Database) -> Self {
        LocalLedgerClient { db }
    }
}

impl LedgerApi for LocalLedgerClient {
    async fn create_sale(
        &self,
        account_id: &str,
        user_id: &str,
        draft: &SaleDraft,
        client_ref: &str,
    ) -> LedgerResult<SaleReceipt> {
        self.db
            .ledger()
            .create_sale(account_id, user_id, draft, Some(client_ref))
            .await
    }

    async fn create_payment(
        &self,
        account_id: &str,
        user_id: &str,
        draft: &PaymentDraft,
        client_ref: &str,
    ) -> LedgerResult<PaymentReceipt> {
        self.db
            .ledger()
            .create_payment(account_id, user_id, draft, Some(client_ref))
            .await
    }
}
