//! # Sync Reconciler
//!
//! Drains the pending queue into the authoritative ledger.
//!
//! ## Replay Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         One Sync Pass                                   │
//! │                                                                         │
//! │  online?  ──no──►  return (queue untouched)                             │
//! │     │yes                                                                │
//! │  pass already running?  ──yes──►  return (single-flight guard)          │
//! │     │no                                                                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  1. pending_sales, FIFO        sales REPLAY BEFORE payments:     │  │
//! │  │     replay each, delete on ok  a payment may target an AR whose  │  │
//! │  │  2. pending_payments, FIFO     sale is still in the queue        │  │
//! │  │     replay each, delete on ok                                    │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  A failed entry stays queued and the pass moves on. temp_id rides      │
//! │  along as client_ref, so re-replaying after a crash is harmless.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::client::LedgerApi;
use crate::error::SyncResult;
use crate::queue::PendingQueue;

// =============================================================================
// Sync Report
// =============================================================================

/// Outcome of one sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Sales accepted by the ledger and removed from the queue.
    pub sales_synced: u64,

    /// Payments accepted by the ledger and removed from the queue.
    pub payments_synced: u64,

    /// Entries the ledger rejected; they remain queued for the next pass.
    pub failed: u64,
}

impl SyncReport {
    /// True when nothing failed (an empty pass is clean too).
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    pub fn total_synced(&self) -> u64 {
        self.sales_synced + self.payments_synced
    }
}

// =============================================================================
// SyncReconciler
// =============================================================================

/// Replays the pending queue against a [`LedgerApi`].
///
/// One reconciler per device. The acting account and user are fixed at
/// construction: queued entries were recorded by this device's operator
/// session, and replay runs under the same identity.
#[derive(Debug)]
pub struct SyncReconciler<C> {
    client: C,
    queue: PendingQueue,
    account_id: String,
    user_id: String,
    online_rx: watch::Receiver<bool>,
    in_flight: AtomicBool,
}

impl<C: LedgerApi> SyncReconciler<C> {
    pub fn new(
        client: C,
        queue: PendingQueue,
        account_id: impl Into<String>,
        user_id: impl Into<String>,
        online_rx: watch::Receiver<bool>,
    ) -> Self {
        SyncReconciler {
            client,
            queue,
            account_id: account_id.into(),
            user_id: user_id.into(),
            online_rx,
            in_flight: AtomicBool::new(false),
        }
    }

    /// The queue this reconciler drains.
    pub fn queue(&self) -> &PendingQueue {
        &self.queue
    }

    /// A fresh receiver on the connectivity channel, for callers that
    /// want to react to the same online/offline edges.
    pub fn online_rx(&self) -> watch::Receiver<bool> {
        self.online_rx.clone()
    }

    /// Runs one sync pass: sales first, then payments, both FIFO.
    ///
    /// No-op while offline or while another pass is still running. Entries
    /// the ledger rejects stay queued; the pass continues with the rest.
    pub async fn sync_pending(&self) -> SyncResult<SyncReport> {
        if !*self.online_rx.borrow() {
            debug!("Offline, skipping sync pass");
            return Ok(SyncReport::default());
        }

        // Single-flight: a tick can fire while the previous pass is still
        // draining a long queue.
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("Sync pass already in flight, skipping");
            return Ok(SyncReport::default());
        }

        let result = self.drain().await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn drain(&self) -> SyncResult<SyncReport> {
        let mut report = SyncReport::default();

        for entry in self.queue.pending_sales().await? {
            match self
                .client
                .create_sale(&self.account_id, &self.user_id, &entry.draft, &entry.temp_id)
                .await
            {
                Ok(receipt) => {
                    self.queue.remove_sale(&entry.temp_id).await?;
                    report.sales_synced += 1;
                    debug!(
                        temp_id = %entry.temp_id,
                        sale_id = %receipt.sale_id,
                        invoice = %receipt.invoice_code,
                        "Sale replayed"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        temp_id = %entry.temp_id,
                        error = %e,
                        "Sale replay rejected, entry stays queued"
                    );
                }
            }
        }

        for entry in self.queue.pending_payments().await? {
            match self
                .client
                .create_payment(&self.account_id, &self.user_id, &entry.draft, &entry.temp_id)
                .await
            {
                Ok(receipt) => {
                    self.queue.remove_payment(&entry.temp_id).await?;
                    report.payments_synced += 1;
                    debug!(
                        temp_id = %entry.temp_id,
                        payment_id = %receipt.payment_id,
                        receipt = %receipt.receipt_code,
                        "Payment replayed"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        temp_id = %entry.temp_id,
                        error = %e,
                        "Payment replay rejected, entry stays queued"
                    );
                }
            }
        }

        if report.total_synced() > 0 || report.failed > 0 {
            info!(
                sales = report.sales_synced,
                payments = report.payments_synced,
                failed = report.failed,
                "Sync pass complete"
            );
        }

        Ok(report)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
