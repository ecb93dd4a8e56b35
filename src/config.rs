//! Configuration for the channel service, loaded from TOML.
//!
//! ```toml
//! buffer_size = 32
//! universe = "inclusive_zero"      # or "zero_based" / "one_based"
//! namespace_by_tenant = false
//! cache_path = "/var/lib/echobox/cache.json"
//!
//! [remote_sync]
//! max_attempts = 3
//! initial_backoff_ms = 200
//! ```
//!
//! Every field is optional; missing ones take the [`Default`] values.

use crate::cache::CacheKeys;
use crate::model::{ChannelUniverse, TenantId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the config file for the demo binary.
pub const CONFIG_PATH_ENV: &str = "ECHOBOX_CHANNELS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Capacity of the actor's request channel.
    pub buffer_size: usize,
    /// Which ids a channel count spans.
    pub universe: ChannelUniverse,
    /// Prefix cache keys with the tenant id. When off, one tenant at a time can be served.
    pub namespace_by_tenant: bool,
    /// File backing the local cache; in-memory when unset.
    pub cache_path: Option<PathBuf>,
    pub remote_sync: RemoteSyncConfig,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            universe: ChannelUniverse::default(),
            namespace_by_tenant: false,
            cache_path: None,
            remote_sync: RemoteSyncConfig::default(),
        }
    }
}

/// Retry policy for pushing unsynced state to the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSyncConfig {
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub initial_backoff_ms: u64,
}

impl Default for RemoteSyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 200,
        }
    }
}

impl RemoteSyncConfig {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }
}

impl ChannelConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::Invalid("buffer_size must be at least 1".into()));
        }
        if self.remote_sync.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "remote_sync.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Cache keys used for `tenant`.
    pub fn cache_keys(&self, tenant: &TenantId) -> CacheKeys {
        if self.namespace_by_tenant {
            CacheKeys::scoped(tenant.as_str())
        } else {
            CacheKeys::fixed()
        }
    }
}
