use crate::cache::{FileCache, MemoryCache, SharedCache};
use crate::channel_actor::{self, ChannelContext};
use crate::clients::ChannelClient;
use crate::config::ChannelConfig;
use crate::remote::SharedRemote;
use std::sync::Arc;
use tracing::{error, info};

/// Runtime orchestrator for the channel service.
///
/// `ChannelSystem` is responsible for:
/// - **Wiring**: building the [`ChannelContext`] (cache, remote store, config) the actor runs with
/// - **Lifecycle**: spawning the channel actor and shutting it down
///
/// # Example
///
/// ```ignore
/// let system = ChannelSystem::new(config, cache, remote);
///
/// system.channel_client.provision("acme".into(), 12).await?;
/// let channel = system.channel_client.reserve_next("acme".into()).await?;
///
/// system.shutdown().await?;
/// ```
pub struct ChannelSystem {
    /// Client for interacting with the channel actor
    pub channel_client: ChannelClient,

    /// The cache the actor writes to
    pub cache: SharedCache,

    handle: tokio::task::JoinHandle<()>,
}

impl ChannelSystem {
    /// Spawns the channel actor over the given cache and remote store.
    pub fn new(config: ChannelConfig, cache: SharedCache, remote: SharedRemote) -> Self {
        let (actor, channel_client) = channel_actor::new(&config);
        let context = ChannelContext::new(cache.clone(), remote, config);
        let handle = tokio::spawn(actor.run(context));

        Self {
            channel_client,
            cache,
            handle,
        }
    }

    /// Like [`new`](Self::new), with the cache backend picked from `config.cache_path`.
    pub fn from_config(config: ChannelConfig, remote: SharedRemote) -> Self {
        let cache: SharedCache = match &config.cache_path {
            Some(path) => {
                info!(path = %path.display(), "Using file-backed channel cache");
                Arc::new(FileCache::open(path))
            }
            None => Arc::new(MemoryCache::new()),
        };
        Self::new(config, cache, remote)
    }

    /// Gracefully shuts down the system.
    ///
    /// Dropping the client closes the actor's channel; the actor drains what is queued and
    /// exits. Clones of the client held elsewhere keep it alive until they are dropped too.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down channel system...");
        drop(self.channel_client);

        if let Err(e) = self.handle.await {
            error!("Channel actor task failed: {:?}", e);
            return Err(format!("Channel actor task failed: {:?}", e));
        }

        info!("Channel system shutdown complete.");
        Ok(())
    }
}
