//! # Sync Agent
//!
//! Background task that runs the reconciler on a timer and on connectivity
//! changes.
//!
//! ## Agent Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Sync Agent Loop                                 │
//! │                                                                         │
//! │  ┌────────────────┐   tick (poll_interval)   ┌────────────────────┐    │
//! │  │ interval timer ├─────────────────────────►│                    │    │
//! │  └────────────────┘                          │  reconciler        │    │
//! │  ┌────────────────┐   went online            │  .sync_pending()   │    │
//! │  │ connectivity   ├─────────────────────────►│                    │    │
//! │  │ watch channel  │   (edge-triggered)       └────────────────────┘    │
//! │  └────────────────┘                                                    │
//! │  ┌────────────────┐   shutdown()                                       │
//! │  │ handle (mpsc)  ├─────────────────────────► break                    │
//! │  └────────────────┘                                                    │
//! │                                                                         │
//! │  Going online triggers an immediate pass instead of waiting out the    │
//! │  poll interval; going offline just lets subsequent ticks no-op.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::client::LedgerApi;
use crate::error::{SyncError, SyncResult};
use crate::reconciler::SyncReconciler;

// =============================================================================
// Sync Agent
// =============================================================================

/// Owns the reconciler and drives it from a background task.
pub struct SyncAgent<C> {
    reconciler: SyncReconciler<C>,
    poll_interval: Duration,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for controlling a running agent.
#[derive(Clone)]
pub struct SyncAgentHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SyncAgentHandle {
    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> SyncResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| SyncError::ShuttingDown)
    }
}

impl<C: LedgerApi> SyncAgent<C> {
    /// Creates a new agent and returns a handle for shutting it down.
    pub fn new(
        reconciler: SyncReconciler<C>,
        poll_interval: Duration,
    ) -> (Self, SyncAgentHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let agent = SyncAgent {
            reconciler,
            poll_interval,
            shutdown_rx,
        };

        (agent, SyncAgentHandle { shutdown_tx })
    }

    /// Runs the agent loop.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!(interval = ?self.poll_interval, "Sync agent starting");

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let mut online_rx = self.reconciler.online_rx();
        // Once the connectivity sender is gone, changed() resolves
        // immediately with Err forever; the branch must be disabled or the
        // loop spins.
        let mut watch_alive = true;

        loop {
            tokio::select! {
                // Poll on interval
                _ = interval.tick() => {
                    if let Err(e) = self.reconciler.sync_pending().await {
                        error!(?e, "Sync pass failed");
                    }
                }

                // Connectivity edge: replay as soon as we are back online
                changed = online_rx.changed(), if watch_alive => {
                    match changed {
                        Ok(()) if *online_rx.borrow() => {
                            info!("Connectivity restored, syncing immediately");
                            if let Err(e) = self.reconciler.sync_pending().await {
                                error!(?e, "Sync pass failed");
                            }
                        }
                        Ok(()) => {
                            info!("Connectivity lost, queueing until it returns");
                        }
                        // Sender dropped: keep polling on the timer alone.
                        Err(_) => {
                            watch_alive = false;
                        }
                    }
                }

                // Shutdown
                _ = self.shutdown_rx.recv() => {
                    info!("Sync agent shutting down");
                    break;
                }
            }
        }

        info!("Sync agent stopped");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::sync::watch;

    use colmado_core::{
        LedgerResult, PaymentDraft, PaymentReceipt, SaleDraft, SaleDraftItem, SaleReceipt,
        SaleType,
    };

    use crate::queue::PendingQueue;

    #[derive(Clone, Default)]
    struct AcceptAll;

    impl LedgerApi for AcceptAll {
        async fn create_sale(
            &self,
            _account_id: &str,
            _user_id: &str,
            _draft: &SaleDraft,
            client_ref: &str,
        ) -> LedgerResult<SaleReceipt> {
            Ok(SaleReceipt {
                sale_id: format!("sale-for-{client_ref}"),
                invoice_code: "A-00001".into(),
                sale_type: SaleType::Credit,
            })
        }

        async fn create_payment(
            &self,
            _account_id: &str,
            _user_id: &str,
            _draft: &PaymentDraft,
            client_ref: &str,
        ) -> LedgerResult<PaymentReceipt> {
            Ok(PaymentReceipt {
                payment_id: format!("payment-for-{client_ref}"),
                receipt_code: "R-000001".into(),
                applied_cents: 0,
                new_balance_cents: 0,
            })
        }
    }

    fn sale_draft() -> SaleDraft {
        SaleDraft {
            customer_id: Some("cust-1".into()),
            sale_type: SaleType::Credit,
            payment_method: None,
            items: vec![SaleDraftItem {
                product_id: "prod-rice".into(),
                qty: 1,
                unit_price_cents: 5_900,
                was_price_overridden: false,
            }],
            shipping_cents: 0,
        }
    }

    /// Waits (real time) until the queue drains or the deadline passes.
    async fn wait_for_drain(queue: &PendingQueue) {
        for _ in 0..100 {
            if queue.counts().await.unwrap().is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("queue did not drain in time");
    }

    // The queue pool and sqlite worker do real I/O, so these tests run on
    // the real clock with a short interval instead of a paused one.
    #[tokio::test]
    async fn test_agent_drains_on_tick() {
        let queue = PendingQueue::in_memory().await.unwrap();
        queue.enqueue_sale(&sale_draft()).await.unwrap();

        let (_online_tx, online_rx) = watch::channel(true);
        let reconciler =
            SyncReconciler::new(AcceptAll, queue.clone(), "acct-1", "user-1", online_rx);
        let (agent, handle) = SyncAgent::new(reconciler, Duration::from_millis(10));

        let task = tokio::spawn(agent.run());

        wait_for_drain(&queue).await;

        handle.shutdown().await.unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_agent_syncs_when_connectivity_returns() {
        let queue = PendingQueue::in_memory().await.unwrap();
        queue.enqueue_sale(&sale_draft()).await.unwrap();

        let (online_tx, online_rx) = watch::channel(false);
        let reconciler =
            SyncReconciler::new(AcceptAll, queue.clone(), "acct-1", "user-1", online_rx);
        // Interval long enough that only the connectivity edge can drain.
        let (agent, handle) = SyncAgent::new(reconciler, Duration::from_secs(3600));

        let task = tokio::spawn(agent.run());
        tokio::task::yield_now().await;
        assert_eq!(queue.counts().await.unwrap().sales, 1);

        // Back online: the agent should replay without waiting for a tick.
        online_tx.send(true).unwrap();
        wait_for_drain(&queue).await;

        handle.shutdown().await.unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_loop() {
        let queue = PendingQueue::in_memory().await.unwrap();
        let (_online_tx, online_rx) = watch::channel(true);
        let reconciler = SyncReconciler::new(AcceptAll, queue, "acct-1", "user-1", online_rx);
        let (agent, handle) = SyncAgent::new(reconciler, Duration::from_secs(60));

        let task = tokio::spawn(agent.run());
        handle.shutdown().await.unwrap();
        task.await.unwrap();
    }
}
