//! Remote tenant records: the nominally authoritative copy of each tenant's channel config.
//!
//! The hosted document database is an external collaborator; this module only defines the seam
//! ([`TenantRecordStore`]) plus an in-process implementation used by the demo and the tests.

pub mod memory;

pub use memory::InMemoryTenantStore;

use crate::model::{TenantChannelConfig, TenantId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by a remote tenant store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RemoteError {
    /// The store could not be reached (network, timeout).
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the request (auth, permissions, validation).
    #[error("Remote store rejected request: {0}")]
    Rejected(String),
}

/// Read/write access to the channel fields of tenant documents.
#[async_trait]
pub trait TenantRecordStore: Send + Sync {
    /// The tenant's channel config, `None` if the tenant has none yet.
    async fn fetch(&self, tenant: &TenantId) -> Result<Option<TenantChannelConfig>, RemoteError>;

    /// Overwrites the tenant's channel config.
    async fn update(&self, tenant: &TenantId, config: &TenantChannelConfig)
        -> Result<(), RemoteError>;
}

/// The remote handle passed around the system.
pub type SharedRemote = Arc<dyn TenantRecordStore>;
