//! Demo: provisions a tenant, edits its channels the way the admin screen does, hands channels
//! out to orders, and survives a remote outage.
//!
//! Set `ECHOBOX_CHANNELS_CONFIG` to a TOML file to override the defaults.

use echobox_channels::config::{ChannelConfig, CONFIG_PATH_ENV};
use echobox_channels::lifecycle::{setup_tracing, ChannelSystem};
use echobox_channels::model::TenantId;
use echobox_channels::remote::InMemoryTenantStore;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => ChannelConfig::from_file(&path).map_err(|e| e.to_string())?,
        Err(_) => ChannelConfig::default(),
    };
    info!(?config, "Starting channel system");

    let remote = Arc::new(InMemoryTenantStore::new());
    let system = ChannelSystem::from_config(config, remote.clone());
    let client = system.channel_client.clone();
    let tenant = TenantId::from("young-tour");

    // Admin sets up the tenant and edits the pool
    let span = tracing::info_span!("admin");
    async {
        client.provision(tenant.clone(), 3).await?;
        client.reserve(tenant.clone(), 1).await?;
        client.toggle(tenant.clone(), 3).await?;
        client.toggle(tenant.clone(), 3).await?;
        let saved = client.save(tenant.clone()).await?;
        info!(free = ?saved.free, iddle = ?saved.iddle, disabled = ?saved.disabled, "Saved");
        Ok::<_, echobox_channels::channel_actor::ChannelError>(())
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    // Orders take channels while the remote store is down
    let span = tracing::info_span!("orders");
    async {
        remote.set_available(false);
        let channel = client.reserve_next(tenant.clone()).await?;
        info!(?channel, "Order assigned channel");

        let snapshot = client.snapshot(tenant.clone()).await?;
        if snapshot.sync.pending {
            warn!(error = ?snapshot.sync.last_error, "Unsynced channel changes");
        }

        remote.set_available(true);
        let status = client.retry_sync(tenant.clone()).await?;
        info!(pending = status.pending, "Sync retried");

        if let Some(channel) = channel {
            client.free(tenant.clone(), channel).await?;
        }
        Ok::<_, echobox_channels::channel_actor::ChannelError>(())
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    let free = client
        .free_channels(tenant.clone())
        .await
        .map_err(|e| e.to_string())?;
    info!(?free, "Final free channels");

    drop(client);
    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
