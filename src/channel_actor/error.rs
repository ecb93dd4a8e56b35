//! Error types for the channel board actor.

use crate::cache::CacheError;
use crate::framework::FrameworkError;
use crate::remote::RemoteError;
use thiserror::Error;

/// Errors that can occur during channel operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChannelError {
    /// No board is loaded for the tenant.
    #[error("Channel board not found: {0}")]
    NotFound(String),

    /// The tenant was already provisioned.
    #[error("Channel board already exists: {0}")]
    AlreadyExists(String),

    /// The unscoped cache keys already hold another tenant's channels.
    #[error("Cache keys are held by tenant {owner}; enable namespace_by_tenant to serve {tenant}")]
    CacheKeysInUse { tenant: String, owner: String },

    /// Writing the local cache failed.
    #[error("Local cache error: {0}")]
    Cache(String),

    /// The remote tenant record could not be read or written.
    #[error("Remote sync failed: {0}")]
    RemoteSync(#[from] RemoteError),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for ChannelError {
    fn from(msg: String) -> Self {
        ChannelError::ActorCommunicationError(msg)
    }
}

impl From<CacheError> for ChannelError {
    fn from(e: CacheError) -> Self {
        ChannelError::Cache(e.to_string())
    }
}

/// Recovers the entity's own error when the actor wrapped one.
impl From<FrameworkError> for ChannelError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => ChannelError::NotFound(id),
            FrameworkError::AlreadyExists(id) => ChannelError::AlreadyExists(id),
            FrameworkError::EntityError(inner) => match inner.downcast::<ChannelError>() {
                Ok(channel_error) => *channel_error,
                Err(other) => ChannelError::ActorCommunicationError(other.to_string()),
            },
            other => ChannelError::ActorCommunicationError(other.to_string()),
        }
    }
}
