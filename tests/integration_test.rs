use echobox_channels::cache::{LocalCache, MemoryCache};
use echobox_channels::channel_actor::ChannelError;
use echobox_channels::clients::ActorClient;
use echobox_channels::config::{ChannelConfig, RemoteSyncConfig};
use echobox_channels::lifecycle::ChannelSystem;
use echobox_channels::model::{ChannelStatus, TenantChannelConfig, TenantId};
use echobox_channels::remote::InMemoryTenantStore;
use std::collections::HashSet;
use std::sync::Arc;

fn fast_config() -> ChannelConfig {
    ChannelConfig {
        remote_sync: RemoteSyncConfig {
            max_attempts: 2,
            initial_backoff_ms: 1,
        },
        ..Default::default()
    }
}

fn start() -> (ChannelSystem, Arc<MemoryCache>, Arc<InMemoryTenantStore>) {
    let cache = Arc::new(MemoryCache::new());
    let remote = Arc::new(InMemoryTenantStore::new());
    let system = ChannelSystem::new(fast_config(), cache.clone(), remote.clone());
    (system, cache, remote)
}

/// Admin flow end to end: provision, reserve, toggle, save, edit again, reset.
#[tokio::test]
async fn test_admin_edit_save_reset() {
    let (system, cache, remote) = start();
    let client = &system.channel_client;
    let tenant = TenantId::from("acme");

    client.provision(tenant.clone(), 3).await.expect("Failed to provision");
    assert_eq!(client.free_channels(tenant.clone()).await.unwrap(), vec![0, 1, 2, 3]);

    client.reserve(tenant.clone(), 1).await.unwrap();
    assert_eq!(client.toggle(tenant.clone(), 3).await.unwrap(), ChannelStatus::Iddle);
    assert_eq!(client.toggle(tenant.clone(), 3).await.unwrap(), ChannelStatus::Disabled);

    let saved = client.save(tenant.clone()).await.expect("Failed to save");
    assert_eq!(saved.iddle, vec![1]);
    assert_eq!(saved.disabled, vec![3]);
    assert_eq!(saved.free, vec![0, 2]);
    assert!(!saved.editing);
    assert_eq!(
        remote.record(&tenant).await,
        Some(TenantChannelConfig {
            channels_num: 3,
            iddle_channels: vec![1].into(),
            disabled_channels: vec![3].into(),
        })
    );

    // Toggle channel 2 from the saved state
    client.toggle(tenant.clone(), 2).await.unwrap();
    let editing = client.snapshot(tenant.clone()).await.unwrap();
    assert_eq!(editing.iddle, vec![1, 2]);
    assert_eq!(editing.disabled, vec![3]);
    assert_eq!(editing.free, vec![0]);
    assert!(editing.editing);

    // Only the free list is written while a draft is open
    assert_eq!(cache.get("freeChannels").as_deref(), Some("[0]"));
    assert_eq!(cache.get("Iddlechannels").as_deref(), Some("[1]"));

    let reset = client.reset(tenant.clone()).await.unwrap();
    assert_eq!(reset.iddle, vec![1]);
    assert_eq!(reset.free, vec![0, 2]);
    assert!(!reset.editing);
    assert_eq!(cache.get("freeChannels").as_deref(), Some("[0,2]"));

    system.shutdown().await.expect("Failed to shutdown");
}

#[tokio::test]
async fn test_reserve_appends_and_excludes_from_free() {
    let (system, _, _) = start();
    let client = &system.channel_client;
    let tenant = TenantId::from("acme");

    client.provision(tenant.clone(), 5).await.unwrap();
    client.reserve(tenant.clone(), 1).await.unwrap();
    client.reserve(tenant.clone(), 2).await.unwrap();
    let snapshot = client.reserve(tenant.clone(), 5).await.unwrap();

    assert_eq!(snapshot.iddle, vec![1, 2, 5]);
    assert!(!snapshot.free.contains(&5));

    // Idempotent both ways
    let again = client.reserve(tenant.clone(), 5).await.unwrap();
    assert_eq!(again.iddle, vec![1, 2, 5]);
    client.free(tenant.clone(), 5).await.unwrap();
    let freed = client.free(tenant.clone(), 5).await.unwrap();
    assert_eq!(freed.iddle, vec![1, 2]);
    assert!(freed.free.contains(&5));

    system.shutdown().await.unwrap();
}

/// Concurrent order assignments must never share a channel.
#[tokio::test]
async fn test_concurrent_reserve_next() {
    let (system, _, _) = start();
    let tenant = TenantId::from("acme");
    // Channels 0..=9
    system
        .channel_client
        .provision(tenant.clone(), 9)
        .await
        .unwrap();

    let mut handles = vec![];
    for _ in 0..10 {
        let client = system.channel_client.clone();
        let tenant = tenant.clone();
        handles.push(tokio::spawn(async move { client.reserve_next(tenant).await }));
    }

    let mut assigned = HashSet::new();
    for handle in handles {
        let channel = handle.await.unwrap().unwrap().expect("Pool exhausted too early");
        assert!(assigned.insert(channel), "Channel {channel} handed out twice");
    }
    assert_eq!(assigned.len(), 10);

    assert_eq!(
        system.channel_client.reserve_next(tenant.clone()).await.unwrap(),
        None
    );
    assert!(system
        .channel_client
        .free_channels(tenant)
        .await
        .unwrap()
        .is_empty());

    system.shutdown().await.unwrap();
}

/// A reservation made while the admin has unsaved toggles survives the later save.
#[tokio::test]
async fn test_reserve_during_draft_is_not_lost() {
    let (system, _, remote) = start();
    let client = &system.channel_client;
    let tenant = TenantId::from("acme");

    client.provision(tenant.clone(), 4).await.unwrap();
    client.toggle(tenant.clone(), 0).await.unwrap();
    client.reserve(tenant.clone(), 2).await.unwrap();

    let draft = client.snapshot(tenant.clone()).await.unwrap();
    assert_eq!(draft.iddle, vec![0, 2]);

    client.save(tenant.clone()).await.unwrap();
    let record = remote.record(&tenant).await.unwrap();
    assert_eq!(record.iddle_channels.as_slice(), &[0, 2]);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_reserve_next_skips_channels_taken_in_draft() {
    let (system, _, _) = start();
    let client = &system.channel_client;
    let tenant = TenantId::from("acme");

    client.provision(tenant.clone(), 2).await.unwrap();
    client.toggle(tenant.clone(), 0).await.unwrap();

    assert_eq!(client.reserve_next(tenant.clone()).await.unwrap(), Some(1));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_remote_outage_is_recorded_and_retried() {
    let (system, cache, remote) = start();
    let client = &system.channel_client;
    let tenant = TenantId::from("acme");

    client.provision(tenant.clone(), 3).await.unwrap();
    remote.set_available(false);

    // Best-effort: the reservation still succeeds locally
    let snapshot = client.reserve(tenant.clone(), 2).await.expect("Reserve must not fail");
    assert_eq!(snapshot.iddle, vec![2]);
    assert!(snapshot.sync.pending);
    assert!(snapshot.sync.last_error.is_some());
    assert_eq!(cache.get("Iddlechannels").as_deref(), Some("[2]"));
    assert!(remote.record(&tenant).await.unwrap().iddle_channels.is_empty());

    // Still down: retry gives up after the configured attempts
    let err = client.retry_sync(tenant.clone()).await.unwrap_err();
    assert!(matches!(err, ChannelError::RemoteSync(_)));
    let still_pending = client.snapshot(tenant.clone()).await.unwrap();
    assert!(still_pending.sync.pending);
    assert_eq!(still_pending.sync.attempts, 3);

    remote.set_available(true);
    let status = client.retry_sync(tenant.clone()).await.unwrap();
    assert!(!status.pending);
    assert_eq!(status.attempts, 0);
    assert_eq!(
        remote.record(&tenant).await.unwrap().iddle_channels.as_slice(),
        &[2]
    );

    // Nothing pending: no extra write
    let writes = remote.write_count();
    client.retry_sync(tenant.clone()).await.unwrap();
    assert_eq!(remote.write_count(), writes);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_save_reports_remote_failure_but_commits_locally() {
    let (system, cache, remote) = start();
    let client = &system.channel_client;
    let tenant = TenantId::from("acme");

    client.provision(tenant.clone(), 3).await.unwrap();
    client.toggle(tenant.clone(), 1).await.unwrap();
    remote.set_available(false);

    let err = client.save(tenant.clone()).await.unwrap_err();
    assert!(matches!(err, ChannelError::RemoteSync(_)));

    let snapshot = client.snapshot(tenant.clone()).await.unwrap();
    assert!(!snapshot.editing);
    assert!(snapshot.sync.pending);
    assert_eq!(cache.get("Iddlechannels").as_deref(), Some("[1]"));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_pull_replaces_local_state() {
    let (system, cache, remote) = start();
    let client = &system.channel_client;
    let tenant = TenantId::from("acme");

    client.toggle(tenant.clone(), 0).await.unwrap();

    // No record yet: local state, draft included, is kept
    let (found, snapshot) = client.pull(tenant.clone()).await.unwrap();
    assert!(!found);
    assert!(snapshot.editing);
    assert_eq!(snapshot.iddle, vec![0]);

    remote
        .insert(
            tenant.clone(),
            TenantChannelConfig {
                channels_num: 5,
                iddle_channels: vec![1].into(),
                disabled_channels: vec![4].into(),
            },
        )
        .await;

    let (found, snapshot) = client.pull(tenant.clone()).await.unwrap();
    assert!(found);
    assert!(!snapshot.editing);
    assert_eq!(snapshot.free, vec![0, 2, 3, 5]);
    assert_eq!(cache.get("channels").as_deref(), Some("5"));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_malformed_cache_opens_with_defaults() {
    let (system, cache, _) = start();
    cache.set("channels", "\"abc\"".to_string()).unwrap();
    cache.set("Iddlechannels", "not json".to_string()).unwrap();

    let snapshot = system
        .channel_client
        .snapshot(TenantId::from("acme"))
        .await
        .unwrap();
    assert_eq!(snapshot.channels, 0);
    assert!(snapshot.iddle.is_empty());
    assert_eq!(snapshot.free, vec![0]);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_provisioning_rules() {
    let (system, cache, remote) = start();
    let client = &system.channel_client;

    client.provision(TenantId::from("acme"), 2).await.unwrap();
    assert_eq!(
        client.provision(TenantId::from("acme"), 2).await.unwrap_err(),
        ChannelError::AlreadyExists("acme".into())
    );

    // Evicting acme frees the unscoped keys for another tenant
    client.delete(TenantId::from("acme")).await.unwrap();

    remote.set_available(false);
    let err = client.provision(TenantId::from("globex"), 4).await.unwrap_err();
    assert!(matches!(err, ChannelError::RemoteSync(_)));
    assert!(client.get(TenantId::from("globex")).await.unwrap().is_none());
    assert_eq!(cache.get("channels").as_deref(), Some("2"));

    // A failed provision does not keep the keys claimed
    remote.set_available(true);
    client.provision(TenantId::from("globex"), 4).await.unwrap();
    assert_eq!(cache.get("channels").as_deref(), Some("4"));

    system.shutdown().await.unwrap();
}

/// With the default unscoped keys a second tenant is refused instead of reading the first
/// tenant's channels and writing them into its own remote record.
#[tokio::test]
async fn test_second_tenant_refused_on_unscoped_keys() {
    let (system, _, remote) = start();
    let client = &system.channel_client;
    let acme = TenantId::from("acme");
    let globex = TenantId::from("globex");

    client.provision(acme.clone(), 3).await.unwrap();
    client.reserve(acme.clone(), 1).await.unwrap();

    let err = client.provision(globex.clone(), 10).await.unwrap_err();
    assert_eq!(
        err,
        ChannelError::CacheKeysInUse {
            tenant: "globex".into(),
            owner: "acme".into(),
        }
    );
    assert!(matches!(
        client.reserve(globex.clone(), 7).await,
        Err(ChannelError::CacheKeysInUse { .. })
    ));
    assert!(remote.record(&globex).await.is_none());

    client.reserve(acme.clone(), 2).await.unwrap();
    assert_eq!(
        remote.record(&acme).await,
        Some(TenantChannelConfig {
            channels_num: 3,
            iddle_channels: vec![1, 2].into(),
            disabled_channels: Default::default(),
        })
    );

    system.shutdown().await.unwrap();
}

/// The admin's pending disable wins over a reservation made meanwhile.
#[tokio::test]
async fn test_reserve_does_not_overlap_draft_disable() {
    let (system, _, remote) = start();
    let client = &system.channel_client;
    let tenant = TenantId::from("acme");

    client.provision(tenant.clone(), 4).await.unwrap();
    client.toggle(tenant.clone(), 2).await.unwrap();
    assert_eq!(client.toggle(tenant.clone(), 2).await.unwrap(), ChannelStatus::Disabled);

    client.reserve(tenant.clone(), 2).await.unwrap();
    assert_eq!(
        remote.record(&tenant).await.unwrap().iddle_channels.as_slice(),
        &[2]
    );
    let draft = client.snapshot(tenant.clone()).await.unwrap();
    assert!(draft.iddle.is_empty());
    assert_eq!(draft.disabled, vec![2]);

    let saved = client.save(tenant.clone()).await.unwrap();
    assert!(saved.iddle.is_empty());
    assert_eq!(saved.disabled, vec![2]);
    let record = remote.record(&tenant).await.unwrap();
    assert!(record.iddle_channels.is_empty());
    assert_eq!(record.disabled_channels.as_slice(), &[2]);

    system.shutdown().await.unwrap();
}

/// Remote validation failures on save are surfaced like outages.
#[tokio::test]
async fn test_save_rejected_by_remote() {
    let (system, _, _) = start();
    let client = &system.channel_client;
    let tenant = TenantId::from("acme");

    client.provision(tenant.clone(), 3).await.unwrap();
    client.set_total(tenant.clone(), -1).await.unwrap();

    let err = client.save(tenant.clone()).await.unwrap_err();
    assert!(matches!(
        err,
        ChannelError::RemoteSync(echobox_channels::remote::RemoteError::Rejected(_))
    ));
    let snapshot = client.snapshot(tenant).await.unwrap();
    assert!(snapshot.sync.pending);
    assert!(snapshot.free.is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_set_total_and_delete() {
    let (system, _, _) = start();
    let client = &system.channel_client;
    let tenant = TenantId::from("acme");

    client.provision(tenant.clone(), 2).await.unwrap();
    let snapshot = client.set_total(tenant.clone(), 4).await.unwrap();
    assert_eq!(snapshot.free, vec![0, 1, 2, 3, 4]);
    assert!(snapshot.editing);

    client.delete(tenant.clone()).await.unwrap();
    assert!(client.get(tenant.clone()).await.unwrap().is_none());

    // Reopening reads the cache, which never saw the unsaved count
    assert_eq!(client.snapshot(tenant).await.unwrap().channels, 2);

    system.shutdown().await.unwrap();
}
