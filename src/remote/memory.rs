use super::{RemoteError, TenantRecordStore};
use crate::model::{TenantChannelConfig, TenantId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Tenant records held in process memory.
///
/// Outages can be simulated with [`set_available`](Self::set_available): while unavailable every
/// call fails with [`RemoteError::Unavailable`]. Records with a negative channel count are
/// refused with [`RemoteError::Rejected`].
#[derive(Debug)]
pub struct InMemoryTenantStore {
    records: RwLock<HashMap<TenantId, TenantChannelConfig>>,
    available: AtomicBool,
    writes: AtomicUsize,
}

impl Default for InMemoryTenantStore {
    fn default() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            writes: AtomicUsize::new(0),
        }
    }
}

impl InMemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record without counting it as a write.
    pub async fn insert(&self, tenant: TenantId, config: TenantChannelConfig) {
        self.records.write().await.insert(tenant, config);
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of successful `update` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Direct read that bypasses the availability switch.
    pub async fn record(&self, tenant: &TenantId) -> Option<TenantChannelConfig> {
        self.records.read().await.get(tenant).cloned()
    }

    fn check_available(&self) -> Result<(), RemoteError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RemoteError::Unavailable("in-memory store switched off".to_string()))
        }
    }
}

#[async_trait]
impl TenantRecordStore for InMemoryTenantStore {
    async fn fetch(&self, tenant: &TenantId) -> Result<Option<TenantChannelConfig>, RemoteError> {
        self.check_available()?;
        let record = self.records.read().await.get(tenant).cloned();
        debug!(%tenant, found = record.is_some(), "Fetched tenant record");
        Ok(record)
    }

    async fn update(
        &self,
        tenant: &TenantId,
        config: &TenantChannelConfig,
    ) -> Result<(), RemoteError> {
        self.check_available()?;
        if config.channels_num < 0 {
            return Err(RemoteError::Rejected(format!(
                "channelsNum must not be negative, got {}",
                config.channels_num
            )));
        }
        self.records
            .write()
            .await
            .insert(tenant.clone(), config.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(%tenant, channels = config.channels_num, "Updated tenant record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_then_fetch() {
        let store = InMemoryTenantStore::new();
        let tenant = TenantId::from("acme");
        assert_eq!(store.fetch(&tenant).await.unwrap(), None);

        let config = TenantChannelConfig {
            channels_num: 4,
            ..Default::default()
        };
        store.update(&tenant, &config).await.unwrap();

        assert_eq!(store.fetch(&tenant).await.unwrap(), Some(config));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = InMemoryTenantStore::new();
        let tenant = TenantId::from("acme");
        store.set_available(false);

        assert!(matches!(
            store.fetch(&tenant).await,
            Err(RemoteError::Unavailable(_))
        ));
        assert!(store
            .update(&tenant, &TenantChannelConfig::default())
            .await
            .is_err());
        assert_eq!(store.write_count(), 0);

        store.set_available(true);
        assert!(store.fetch(&tenant).await.is_ok());
    }

    #[tokio::test]
    async fn negative_channel_count_is_rejected() {
        let store = InMemoryTenantStore::new();
        let tenant = TenantId::from("acme");
        let config = TenantChannelConfig {
            channels_num: -1,
            ..Default::default()
        };

        assert!(matches!(
            store.update(&tenant, &config).await,
            Err(RemoteError::Rejected(_))
        ));
        assert_eq!(store.record(&tenant).await, None);
        assert_eq!(store.write_count(), 0);
    }
}
