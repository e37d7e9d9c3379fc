//! # colmado-sync: Offline Reconciliation for Colmado POS
//!
//! This crate provides the offline side of the AR ledger: sales and
//! payments taken while the back office is unreachable are queued on the
//! device and replayed into [`colmado_db`] when connectivity returns.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Offline Reconciliation Flow                        │
//! │                                                                         │
//! │  POS frontend (offline)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌────────────────┐     enqueue_sale / enqueue_payment                  │
//! │  │  PendingQueue  │◄────────────────────────────────────                │
//! │  │  (queue.rs)    │     drafts stored as JSON, temp_id assigned         │
//! │  └───────┬────────┘                                                     │
//! │          │ FIFO, sales before payments                                  │
//! │          ▼                                                              │
//! │  ┌────────────────┐     temp_id = client_ref                            │
//! │  │ SyncReconciler ├──────────────────────────► ┌────────────────────┐   │
//! │  │ (reconciler.rs)│     create_sale /          │  LedgerApi         │   │
//! │  └───────▲────────┘     create_payment         │  (client.rs)       │   │
//! │          │                                     └─────────┬──────────┘   │
//! │          │ tick / went-online                            │              │
//! │  ┌───────┴────────┐                            ┌─────────▼──────────┐   │
//! │  │  SyncAgent     │                            │  colmado-db        │   │
//! │  │  (agent.rs)    │                            │  Ledger            │   │
//! │  └────────────────┘                            └────────────────────┘   │
//! │                                                                         │
//! │  GUARANTEES:                                                           │
//! │  • Queue entries are deleted only after the ledger accepts them        │
//! │  • Replay after a crash is safe: the ledger dedups on client_ref       │
//! │  • One rejected entry never blocks the rest of the queue               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`agent`] - Background task driving the reconciler
//! - [`client`] - [`LedgerApi`] seam and the local-database implementation
//! - [`config`] - Device and queue configuration (TOML + env)
//! - [`error`] - Sync error types
//! - [`queue`] - The device-local pending queue
//! - [`reconciler`] - The replay pass itself
//!
//! ## Usage
//!
//! ```rust,ignore
//! use colmado_sync::{LocalLedgerClient, PendingQueue, SyncAgent, SyncConfig, SyncReconciler};
//!
//! let config = SyncConfig::load_or_default(None);
//! let queue = PendingQueue::open(config.queue_path().unwrap()).await?;
//!
//! // While offline, the frontend enqueues instead of writing the ledger:
//! queue.enqueue_sale(&draft).await?;
//!
//! // The agent replays on a timer and whenever connectivity returns:
//! let client = LocalLedgerClient::new(database);
//! let reconciler = SyncReconciler::new(client, queue, account_id, user_id, online_rx);
//! let (agent, handle) = SyncAgent::new(reconciler, config.poll_interval());
//! tokio::spawn(agent.run());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod agent;
pub mod client;
pub mod config;
pub mod error;
pub mod queue;
pub mod reconciler;

#[cfg(test)]
mod tests;

// =============================================================================
// Re-exports
// =============================================================================

pub use agent::{SyncAgent, SyncAgentHandle};
pub use client::{LedgerApi, LocalLedgerClient};
pub use config::{DeviceConfig, QueueSettings, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use queue::{PendingQueue, QueueCounts};
pub use reconciler::{SyncReconciler, SyncReport};
