//! # Sync Configuration
//!
//! Configuration for the offline queue and reconciler.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     COLMADO_DEVICE_ID=abc-123                                          │
//! │     COLMADO_QUEUE_PATH=/var/lib/colmado/pending.db                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/colmado-pos/sync.toml (Linux)                            │
//! │     ~/Library/Application Support/do.colmado.pos/sync.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     auto-generated device_id, queue next to the config file            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! [device]
//! id = "550e8400-e29b-41d4-a716-446655440000"
//! name = "Caja 1"
//!
//! [queue]
//! path = "/var/lib/colmado/pending.db"
//! poll_interval_secs = 15
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Device Configuration
// =============================================================================

/// Configuration for this POS device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Unique device identifier (UUID v4).
    /// Auto-generated on first run if not provided.
    pub id: String,

    /// Human-readable device name (e.g., "Caja 1", "Mostrador").
    #[serde(default = "default_device_name")]
    pub name: String,
}

fn default_device_name() -> String {
    "Caja".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            id: Uuid::new_v4().to_string(),
            name: default_device_name(),
        }
    }
}

// =============================================================================
// Queue Settings
// =============================================================================

/// Pending-queue behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSettings {
    /// Path of the device-local queue file. When unset, the queue lives
    /// next to the config file.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Interval between reconciler poll passes (seconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval() -> u64 {
    15
}

impl Default for QueueSettings {
    fn default() -> Self {
        QueueSettings {
            path: None,
            poll_interval_secs: default_poll_interval(),
        }
    }
}

// =============================================================================
// Main Sync Configuration
// =============================================================================

/// Complete sync configuration.
///
/// ## Example Config File
/// ```toml
/// [device]
/// id = "550e8400-e29b-41d4-a716-446655440000"
/// name = "Caja 1"
///
/// [queue]
/// poll_interval_secs = 15
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Device-specific configuration.
    #[serde(default)]
    pub device: DeviceConfig,

    /// Queue behavior settings.
    #[serde(default)]
    pub queue: QueueSettings,
}

impl SyncConfig {
    /// Creates a new config with defaults and a generated device ID.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (sync.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading sync config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load sync config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Sync config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.device.id.is_empty() {
            return Err(SyncError::MissingDeviceId);
        }

        if self.queue.poll_interval_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "poll_interval_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var("COLMADO_DEVICE_ID") {
            debug!(device_id = %id, "Overriding device ID from environment");
            self.device.id = id;
        }

        if let Ok(name) = std::env::var("COLMADO_DEVICE_NAME") {
            self.device.name = name;
        }

        if let Ok(path) = std::env::var("COLMADO_QUEUE_PATH") {
            debug!(path = %path, "Overriding queue path from environment");
            self.queue.path = Some(PathBuf::from(path));
        }

        if let Ok(interval) = std::env::var("COLMADO_POLL_INTERVAL_SECS") {
            if let Ok(secs) = interval.parse::<u64>() {
                self.queue.poll_interval_secs = secs;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("do", "colmado", "pos")
            .map(|dirs| dirs.config_dir().join("sync.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the device ID.
    pub fn device_id(&self) -> &str {
        &self.device.id
    }

    /// Resolves the queue file path: the configured one, or `pending.db`
    /// in the platform data directory.
    pub fn queue_path(&self) -> Option<PathBuf> {
        self.queue.path.clone().or_else(|| {
            directories::ProjectDirs::from("do", "colmado", "pos")
                .map(|dirs| dirs.data_dir().join("pending.db"))
        })
    }

    /// Returns the reconciler poll interval.
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.queue.poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert!(!config.device.id.is_empty()); // Auto-generated
        assert_eq!(config.queue.poll_interval_secs, 15);
        assert!(config.queue.path.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SyncConfig::default();
        assert!(config.validate().is_ok());

        config.device.id = String::new();
        assert!(config.validate().is_err());

        config.device.id = "caja-1".to_string();
        config.queue.poll_interval_secs = 0;
        assert!(config.validate().is_err());

        config.queue.poll_interval_secs = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_serialization() {
        let config = SyncConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[device]"));
        assert!(toml_str.contains("[queue]"));

        let parsed: SyncConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.device.id, config.device.id);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: SyncConfig = toml::from_str(
            r#"
            [device]
            id = "caja-1"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.device.id, "caja-1");
        assert_eq!(parsed.device.name, "Caja");
        assert_eq!(parsed.queue.poll_interval_secs, 15);
    }
}
