//! # Channel Client
//!
//! High-level API over the channel actor. Screens and the order flow call these methods; none
//! of them ever touch cache keys or message enums directly.
use crate::channel_actor::{
    ChannelAction, ChannelActionResult, ChannelBoard, ChannelError, ChannelSnapshot,
    ChannelsCreate, ChannelsUpdate, SyncStatus,
};
use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{ChannelId, ChannelStatus, TenantId};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the channel actor.
#[derive(Clone)]
pub struct ChannelClient {
    inner: ResourceClient<ChannelBoard>,
}

#[async_trait]
impl ActorClient<ChannelBoard> for ChannelClient {
    type Error = ChannelError;

    fn inner(&self) -> &ResourceClient<ChannelBoard> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        ChannelError::from(e)
    }
}

fn unexpected(result: ChannelActionResult) -> ChannelError {
    ChannelError::ActorCommunicationError(format!("unexpected action result: {result:?}"))
}

impl ChannelClient {
    pub fn new(inner: ResourceClient<ChannelBoard>) -> Self {
        Self { inner }
    }

    /// Sets a tenant up with `channels` channels and nothing reserved or disabled.
    ///
    /// Fails if the remote record cannot be written.
    #[instrument(skip(self))]
    pub async fn provision(&self, tenant: TenantId, channels: i64) -> Result<TenantId, ChannelError> {
        debug!("Sending request");
        self.inner
            .create(tenant, ChannelsCreate { channels })
            .await
            .map_err(ChannelError::from)
    }

    /// Opens the tenant's board if needed, then runs `action` on it.
    async fn act(
        &self,
        tenant: TenantId,
        action: ChannelAction,
    ) -> Result<ChannelActionResult, ChannelError> {
        self.inner
            .open(tenant.clone())
            .await
            .map_err(ChannelError::from)?;
        self.inner
            .perform_action(tenant, action)
            .await
            .map_err(ChannelError::from)
    }

    #[instrument(skip(self))]
    pub async fn snapshot(&self, tenant: TenantId) -> Result<ChannelSnapshot, ChannelError> {
        match self.act(tenant, ChannelAction::Snapshot).await? {
            ChannelActionResult::Snapshot(snapshot) => Ok(snapshot),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn free_channels(&self, tenant: TenantId) -> Result<Vec<ChannelId>, ChannelError> {
        Ok(self.snapshot(tenant).await?.free)
    }

    #[instrument(skip(self))]
    pub async fn status(
        &self,
        tenant: TenantId,
        channel: ChannelId,
    ) -> Result<ChannelStatus, ChannelError> {
        match self.act(tenant, ChannelAction::Status(channel)).await? {
            ChannelActionResult::Status(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }

    /// Advances one channel through free -> iddle -> disabled -> free.
    ///
    /// The change stays in the draft until [`save`](Self::save).
    #[instrument(skip(self))]
    pub async fn toggle(
        &self,
        tenant: TenantId,
        channel: ChannelId,
    ) -> Result<ChannelStatus, ChannelError> {
        match self.act(tenant, ChannelAction::Toggle(channel)).await? {
            ChannelActionResult::Toggle(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }

    /// Bulk edit of the draft.
    #[instrument(skip(self))]
    pub async fn update_channels(
        &self,
        tenant: TenantId,
        update: ChannelsUpdate,
    ) -> Result<ChannelSnapshot, ChannelError> {
        self.inner
            .open(tenant.clone())
            .await
            .map_err(ChannelError::from)?;
        let board = self
            .inner
            .update(tenant, update)
            .await
            .map_err(ChannelError::from)?;
        Ok(board.snapshot())
    }

    /// Changes the channel count in the draft.
    pub async fn set_total(
        &self,
        tenant: TenantId,
        channels: i64,
    ) -> Result<ChannelSnapshot, ChannelError> {
        self.update_channels(
            tenant,
            ChannelsUpdate {
                channels: Some(channels),
                ..Default::default()
            },
        )
        .await
    }

    /// Marks `channel` as in use. Remote failures are recorded in the snapshot's sync status.
    #[instrument(skip(self))]
    pub async fn reserve(
        &self,
        tenant: TenantId,
        channel: ChannelId,
    ) -> Result<ChannelSnapshot, ChannelError> {
        match self.act(tenant, ChannelAction::Reserve(channel)).await? {
            ChannelActionResult::Reserve(snapshot) => Ok(snapshot),
            other => Err(unexpected(other)),
        }
    }

    /// Releases `channel`. Remote failures are recorded in the snapshot's sync status.
    #[instrument(skip(self))]
    pub async fn free(
        &self,
        tenant: TenantId,
        channel: ChannelId,
    ) -> Result<ChannelSnapshot, ChannelError> {
        match self.act(tenant, ChannelAction::Free(channel)).await? {
            ChannelActionResult::Free(snapshot) => Ok(snapshot),
            other => Err(unexpected(other)),
        }
    }

    /// Reserves the lowest free channel for an order; `None` when the pool is exhausted.
    #[instrument(skip(self))]
    pub async fn reserve_next(&self, tenant: TenantId) -> Result<Option<ChannelId>, ChannelError> {
        match self.act(tenant, ChannelAction::ReserveNext).await? {
            ChannelActionResult::ReserveNext(channel) => Ok(channel),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn recompute(&self, tenant: TenantId) -> Result<Vec<ChannelId>, ChannelError> {
        match self.act(tenant, ChannelAction::Recompute).await? {
            ChannelActionResult::Recompute(free) => Ok(free),
            other => Err(unexpected(other)),
        }
    }

    /// Commits the draft to the local cache and the remote record.
    ///
    /// The only operation that reports a remote failure as an error after changing local state.
    #[instrument(skip(self))]
    pub async fn save(&self, tenant: TenantId) -> Result<ChannelSnapshot, ChannelError> {
        match self.act(tenant, ChannelAction::Save).await? {
            ChannelActionResult::Save(snapshot) => Ok(snapshot),
            other => Err(unexpected(other)),
        }
    }

    /// Discards the draft and re-reads the local cache.
    #[instrument(skip(self))]
    pub async fn reset(&self, tenant: TenantId) -> Result<ChannelSnapshot, ChannelError> {
        match self.act(tenant, ChannelAction::Reset).await? {
            ChannelActionResult::Reset(snapshot) => Ok(snapshot),
            other => Err(unexpected(other)),
        }
    }

    /// Replaces local state with the remote record. Returns `false` if the tenant has none.
    #[instrument(skip(self))]
    pub async fn pull(&self, tenant: TenantId) -> Result<(bool, ChannelSnapshot), ChannelError> {
        match self.act(tenant, ChannelAction::Pull).await? {
            ChannelActionResult::Pull { found, snapshot } => Ok((found, snapshot)),
            other => Err(unexpected(other)),
        }
    }

    /// Pushes unsynced state with retry and backoff.
    #[instrument(skip(self))]
    pub async fn retry_sync(&self, tenant: TenantId) -> Result<SyncStatus, ChannelError> {
        match self.act(tenant, ChannelAction::RetrySync).await? {
            ChannelActionResult::RetrySync(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_client, expect_action, expect_open, MockClient};
    use crate::model::ChannelState;

    fn board(tenant: &str, state: ChannelState) -> ChannelBoard {
        let mut board = ChannelBoard::new(TenantId::from(tenant), state);
        board.free = board
            .committed
            .free(crate::model::ChannelUniverse::InclusiveZero);
        board
    }

    #[tokio::test]
    async fn test_reserve_sends_open_then_action() {
        let (client, mut receiver) = create_mock_client::<ChannelBoard>(10);
        let channel_client = ChannelClient::new(client);

        let task = tokio::spawn(async move { channel_client.reserve("acme".into(), 5).await });

        let (id, responder) = expect_open(&mut receiver).await.expect("Expected Open request");
        assert_eq!(id, TenantId::from("acme"));
        responder
            .send(Ok(board("acme", ChannelState::new(5, &[1, 2], &[]))))
            .unwrap();

        let (id, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(id, TenantId::from("acme"));
        assert!(matches!(action, ChannelAction::Reserve(5)));

        let reserved = board("acme", ChannelState::new(5, &[1, 2, 5], &[]));
        responder
            .send(Ok(ChannelActionResult::Reserve(reserved.snapshot())))
            .unwrap();

        let snapshot = task.await.unwrap().unwrap();
        assert_eq!(snapshot.iddle, vec![1, 2, 5]);
        assert!(!snapshot.free.contains(&5));
    }

    #[tokio::test]
    async fn test_toggle_with_expectations() {
        let mut mock = MockClient::<ChannelBoard>::new();
        let tenant = TenantId::from("acme");

        mock.expect_open(tenant.clone())
            .return_ok(board("acme", ChannelState::new(3, &[1], &[3])));
        mock.expect_action(tenant.clone())
            .return_ok(ChannelActionResult::Toggle(ChannelStatus::Iddle));

        let client = ChannelClient::new(mock.client());
        let status = client.toggle(tenant, 2).await.unwrap();
        assert_eq!(status, ChannelStatus::Iddle);

        mock.verify();
    }

    #[tokio::test]
    async fn test_save_surfaces_remote_failure() {
        let mut mock = MockClient::<ChannelBoard>::new();
        let tenant = TenantId::from("acme");

        mock.expect_open(tenant.clone())
            .return_ok(board("acme", ChannelState::new(3, &[], &[])));
        mock.expect_action(tenant.clone())
            .return_err(FrameworkError::EntityError(Box::new(ChannelError::RemoteSync(
                crate::remote::RemoteError::Unavailable("offline".into()),
            ))));

        let client = ChannelClient::new(mock.client());
        let err = client.save(tenant).await.unwrap_err();
        assert!(matches!(err, ChannelError::RemoteSync(_)));

        mock.verify();
    }

    #[tokio::test]
    async fn test_mismatched_result_is_an_error() {
        let mut mock = MockClient::<ChannelBoard>::new();
        let tenant = TenantId::from("acme");

        mock.expect_open(tenant.clone())
            .return_ok(board("acme", ChannelState::new(3, &[], &[])));
        mock.expect_action(tenant.clone())
            .return_ok(ChannelActionResult::Recompute(vec![0]));

        let client = ChannelClient::new(mock.client());
        let err = client.reserve_next(tenant).await.unwrap_err();
        assert!(matches!(err, ChannelError::ActorCommunicationError(_)));
    }

    #[tokio::test]
    async fn test_provision_already_exists() {
        let mut mock = MockClient::<ChannelBoard>::new();
        let tenant = TenantId::from("acme");

        mock.expect_create(tenant.clone())
            .return_err(FrameworkError::AlreadyExists("acme".into()));

        let client = ChannelClient::new(mock.client());
        let err = client.provision(tenant, 4).await.unwrap_err();
        assert_eq!(err, ChannelError::AlreadyExists("acme".into()));
    }
}
