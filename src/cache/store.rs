//! The one place that knows the cache keys and their encoding.

use super::{CacheError, SharedCache};
use crate::model::{ChannelId, ChannelSet, ChannelState, ChannelUniverse};
use serde_json::Value;
use tracing::debug;

/// Key names for the four cached values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    pub channels: String,
    pub iddle: String,
    pub disabled: String,
    pub free: String,
}

impl CacheKeys {
    /// The bare keys the admin screens have always used.
    pub fn fixed() -> Self {
        Self {
            channels: "channels".to_string(),
            iddle: "Iddlechannels".to_string(),
            disabled: "disabledChannels".to_string(),
            free: "freeChannels".to_string(),
        }
    }

    /// Keys prefixed with `"<scope>:"`, for several tenants sharing one cache.
    pub fn scoped(scope: &str) -> Self {
        let fixed = Self::fixed();
        Self {
            channels: format!("{scope}:{}", fixed.channels),
            iddle: format!("{scope}:{}", fixed.iddle),
            disabled: format!("{scope}:{}", fixed.disabled),
            free: format!("{scope}:{}", fixed.free),
        }
    }
}

impl Default for CacheKeys {
    fn default() -> Self {
        Self::fixed()
    }
}

/// Reads and writes a tenant's channel state in the local cache.
#[derive(Clone)]
pub struct ChannelStore {
    cache: SharedCache,
    keys: CacheKeys,
}

impl ChannelStore {
    pub fn new(cache: SharedCache, keys: CacheKeys) -> Self {
        Self { cache, keys }
    }

    /// Current cached state. Absent or malformed values read as `0` / empty.
    pub fn load(&self) -> ChannelState {
        ChannelState {
            channels: self.read_count(&self.keys.channels),
            iddle: self.read_set(&self.keys.iddle),
            disabled: self.read_set(&self.keys.disabled),
        }
    }

    /// Writes the full triple plus the recomputed free list; returns that free list.
    pub fn save(
        &self,
        state: &ChannelState,
        universe: ChannelUniverse,
    ) -> Result<Vec<ChannelId>, CacheError> {
        self.cache
            .set(&self.keys.channels, serde_json::to_string(&state.channels)?)?;
        self.cache
            .set(&self.keys.iddle, serde_json::to_string(&state.iddle)?)?;
        self.cache
            .set(&self.keys.disabled, serde_json::to_string(&state.disabled)?)?;
        let free = state.free(universe);
        self.write_free(&free)?;
        Ok(free)
    }

    /// Writes only the derived free list.
    pub fn write_free(&self, free: &[ChannelId]) -> Result<(), CacheError> {
        self.cache.set(&self.keys.free, serde_json::to_string(free)?)
    }

    /// The cached free list as last written. Display only; never authoritative.
    pub fn cached_free(&self) -> Vec<ChannelId> {
        self.read_set(&self.keys.free).iter().collect()
    }

    fn read_value(&self, key: &str) -> Option<Value> {
        let raw = self.cache.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key, error = %e, "Ignoring malformed cache value");
                None
            }
        }
    }

    fn read_count(&self, key: &str) -> i64 {
        match self.read_value(key) {
            Some(value) => value.as_i64().unwrap_or_else(|| {
                debug!(key, %value, "Channel count is not an integer");
                0
            }),
            None => 0,
        }
    }

    // Entries that are not integers can never match a channel id, so they are dropped
    fn read_set(&self, key: &str) -> ChannelSet {
        match self.read_value(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_i64).collect(),
            Some(other) => {
                debug!(key, value = %other, "Channel list is not an array");
                ChannelSet::new()
            }
            None => ChannelSet::new(),
        }
    }
}
