//! # Channel Actor
//!
//! The resource actor that owns every tenant's [`ChannelBoard`].
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](crate::framework::ActorEntity) implementation for [`ChannelBoard`]
//! - [`actions`] - [`ChannelAction`] / [`ChannelActionResult`] and the snapshot types
//! - [`error`] - [`ChannelError`]
//! - [`new()`] - Factory that creates the actor and its client
//!
//! ## Why an actor
//!
//! Toggles from the admin screen and reserve/free calls from the order flow touch the same
//! cached keys. Routing both through one actor task turns their read-modify-write cycles into a
//! queue, so neither can overwrite the other inside this process.
//!
//! ## Usage
//!
//! ```rust
//! use echobox_channels::cache::MemoryCache;
//! use echobox_channels::channel_actor::{self, ChannelContext};
//! use echobox_channels::config::ChannelConfig;
//! use echobox_channels::remote::InMemoryTenantStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ChannelConfig::default();
//!     let ctx = ChannelContext::new(
//!         Arc::new(MemoryCache::new()),
//!         Arc::new(InMemoryTenantStore::new()),
//!         config.clone(),
//!     );
//!     let (actor, client) = channel_actor::new(&config);
//!     tokio::spawn(actor.run(ctx));
//!
//!     client.provision("acme".into(), 3).await?;
//!     client.reserve("acme".into(), 1).await?;
//!     assert_eq!(client.free_channels("acme".into()).await?, vec![0, 2, 3]);
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::ChannelBoard;
pub use error::*;

use crate::cache::{ChannelStore, SharedCache};
use crate::clients::ChannelClient;
use crate::config::ChannelConfig;
use crate::framework::ResourceActor;
use crate::model::TenantId;
use crate::remote::SharedRemote;
use std::sync::{Arc, Mutex};

/// Dependencies injected into every [`ChannelBoard`] hook.
#[derive(Clone)]
pub struct ChannelContext {
    pub cache: SharedCache,
    pub remote: SharedRemote,
    pub config: ChannelConfig,
    /// Tenant whose board currently owns the unscoped cache keys.
    keys_owner: Arc<Mutex<Option<TenantId>>>,
}

impl ChannelContext {
    pub fn new(cache: SharedCache, remote: SharedRemote, config: ChannelConfig) -> Self {
        Self {
            cache,
            remote,
            config,
            keys_owner: Arc::new(Mutex::new(None)),
        }
    }

    /// Cache access for `tenant`, keyed per the namespacing setting.
    pub fn store(&self, tenant: &TenantId) -> ChannelStore {
        ChannelStore::new(self.cache.clone(), self.config.cache_keys(tenant))
    }

    /// Reserves the unscoped cache keys for `tenant`.
    ///
    /// Without `namespace_by_tenant` every tenant maps to the same four keys, so only one board
    /// may be loaded at a time. Always succeeds when keys are namespaced.
    pub fn claim_keys(&self, tenant: &TenantId) -> Result<(), ChannelError> {
        if self.config.namespace_by_tenant {
            return Ok(());
        }
        let mut owner = self.keys_owner.lock().unwrap_or_else(|e| e.into_inner());
        match owner.as_ref() {
            Some(current) if current != tenant => Err(ChannelError::CacheKeysInUse {
                tenant: tenant.to_string(),
                owner: current.to_string(),
            }),
            _ => {
                *owner = Some(tenant.clone());
                Ok(())
            }
        }
    }

    /// Gives the unscoped cache keys back if `tenant` holds them.
    pub fn release_keys(&self, tenant: &TenantId) {
        let mut owner = self.keys_owner.lock().unwrap_or_else(|e| e.into_inner());
        if owner.as_ref() == Some(tenant) {
            *owner = None;
        }
    }
}

/// Creates the channel actor and its client.
pub fn new(config: &ChannelConfig) -> (ResourceActor<ChannelBoard>, ChannelClient) {
    let (actor, generic_client) = ResourceActor::new(config.buffer_size);
    (actor, ChannelClient::new(generic_client))
}
