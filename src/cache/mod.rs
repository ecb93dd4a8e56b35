//! Local key/value cache the channel state is mirrored into.
//!
//! The cache plays the part of browser-local storage: synchronous, string keys, JSON values,
//! shared by everything in the process. Callers never touch raw keys; they go through
//! [`ChannelStore`].

pub mod file;
pub mod memory;
pub mod store;

pub use file::FileCache;
pub use memory::MemoryCache;
pub use store::{CacheKeys, ChannelStore};

use std::sync::Arc;
use thiserror::Error;

/// Errors raised when writing to a cache backend.
///
/// Reads never fail: a missing or unreadable value is reported as absent.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A synchronous string-keyed store.
pub trait LocalCache: Send + Sync {
    /// Raw value for `key`, `None` when absent.
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String) -> Result<(), CacheError>;

    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// The cache handle passed around the system.
pub type SharedCache = Arc<dyn LocalCache>;
