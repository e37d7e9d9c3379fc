//! # Sync Error Types
//!
//! Error types for the offline queue and reconciler.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Queue       │  │     Replay              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  DatabaseError  │  │  ReplayFailed           │ │
//! │  │  MissingDeviceId│  │  Serialization  │  │  SyncInProgress         │ │
//! │  │  ConfigLoad/Save│  │  EmptyPayload   │  │  Offline                │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering queue, config, and replay failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Missing device ID (required for queueing).
    #[error("Device ID not configured. Run initial setup first.")]
    MissingDeviceId,

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Queue Errors
    // =========================================================================
    /// Queue database operation failed.
    #[error("Queue database error: {0}")]
    DatabaseError(String),

    /// Failed to serialize a queue payload.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Failed to deserialize a queue payload.
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// A queue row with no payload. Should not happen; points at a
    /// partial write or manual tampering with the queue file.
    #[error("Queue entry {temp_id} has empty payload")]
    EmptyPayload { temp_id: String },

    // =========================================================================
    // Replay Errors
    // =========================================================================
    /// The ledger rejected a replayed entry.
    #[error("Replay failed for entry {temp_id}: {reason}")]
    ReplayFailed { temp_id: String, reason: String },

    /// A ledger error outside the per-entry replay loop.
    #[error("Ledger rejected the operation: {0}")]
    LedgerRejected(String),

    /// A sync pass is already running on this device.
    #[error("Sync already in progress")]
    SyncInProgress,

    /// The device is offline; replay is a no-op until connectivity returns.
    #[error("Device is offline")]
    Offline,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal sync agent error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Agent is shutting down.
    #[error("Sync agent is shutting down")]
    ShuttingDown,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<colmado_db::DbError> for SyncError {
    fn from(err: colmado_db::DbError) -> Self {
        SyncError::DatabaseError(err.to_string())
    }
}

impl From<colmado_core::LedgerError> for SyncError {
    fn from(err: colmado_core::LedgerError) -> Self {
        SyncError::LedgerRejected(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationFailed(err.to_string())
    }
}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        SyncError::DatabaseError(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl SyncError {
    /// Returns true if the operation can be retried on a later sync pass.
    ///
    /// ## Retryable Errors
    /// - Queue database hiccups
    /// - Replay failures (the entry stays queued)
    /// - Offline / concurrent-pass conditions
    ///
    /// ## Non-Retryable Errors
    /// - Configuration errors
    /// - Corrupt payloads (retrying re-reads the same bytes)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::DatabaseError(_)
                | SyncError::ReplayFailed { .. }
                | SyncError::LedgerRejected(_)
                | SyncError::SyncInProgress
                | SyncError::Offline
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::MissingDeviceId
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(SyncError::DatabaseError("disk io".into()).is_retryable());
        assert!(SyncError::Offline.is_retryable());
        assert!(SyncError::SyncInProgress.is_retryable());

        assert!(!SyncError::InvalidConfig("bad config".into()).is_retryable());
        assert!(!SyncError::MissingDeviceId.is_retryable());
        assert!(!SyncError::DeserializationFailed("truncated".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::ReplayFailed {
            temp_id: "tmp-abc".into(),
            reason: "Sale has no items".into(),
        };
        assert!(err.to_string().contains("tmp-abc"));
        assert!(err.to_string().contains("Sale has no items"));
    }
}
