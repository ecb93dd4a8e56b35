//! [`ActorEntity`] implementation for [`ChannelBoard`].
//!
//! A board holds two copies of a tenant's channel state:
//!
//! - `committed`: what the local cache holds under the `channels` / `Iddlechannels` /
//!   `disabledChannels` keys and what gets pushed to the remote record.
//! - `draft`: admin edits (toggles, bulk updates) not saved yet. Only `freeChannels` is written
//!   while a draft is open; `Save` commits it and `Reset` throws it away.
//!
//! Reserve/free from the order flow always work on `committed`, re-read from the cache first,
//! and are mirrored into an open draft so a later `Save` keeps them.

use super::actions::{
    ChannelAction, ChannelActionResult, ChannelSnapshot, ChannelsCreate, ChannelsUpdate,
    SyncStatus,
};
use super::error::ChannelError;
use super::ChannelContext;
use crate::framework::ActorEntity;
use crate::model::{ChannelId, ChannelSet, ChannelState, ChannelStatus, TenantChannelConfig, TenantId};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// One tenant's channel partition, owned by the channel actor.
#[derive(Debug, Clone)]
pub struct ChannelBoard {
    pub tenant: TenantId,
    pub committed: ChannelState,
    pub draft: Option<ChannelState>,
    /// Free list of the effective state as last computed.
    pub free: Vec<ChannelId>,
    pub sync: SyncStatus,
}

impl ChannelBoard {
    pub fn new(tenant: TenantId, committed: ChannelState) -> Self {
        Self {
            tenant,
            committed,
            draft: None,
            free: Vec::new(),
            sync: SyncStatus::default(),
        }
    }

    /// The draft if one is open, the committed state otherwise.
    pub fn effective(&self) -> &ChannelState {
        self.draft.as_ref().unwrap_or(&self.committed)
    }

    pub fn snapshot(&self) -> ChannelSnapshot {
        let state = self.effective();
        ChannelSnapshot {
            tenant: self.tenant.clone(),
            channels: state.channels,
            iddle: state.iddle.as_slice().to_vec(),
            disabled: state.disabled.as_slice().to_vec(),
            free: self.free.clone(),
            editing: self.draft.is_some(),
            sync: self.sync.clone(),
        }
    }

    fn draft_mut(&mut self) -> &mut ChannelState {
        self.draft.get_or_insert_with(|| self.committed.clone())
    }

    /// Recomputes `free` from the effective state and writes it to the cache.
    fn recompute(&mut self, ctx: &ChannelContext) -> Result<Vec<ChannelId>, ChannelError> {
        self.free = self.effective().free(ctx.config.universe);
        ctx.store(&self.tenant).write_free(&self.free)?;
        debug!(tenant = %self.tenant, free = self.free.len(), "Recomputed free channels");
        Ok(self.free.clone())
    }

    /// Writes `committed` to every cache key, then refreshes `free` for the effective state.
    fn persist_local(&mut self, ctx: &ChannelContext) -> Result<(), ChannelError> {
        let store = ctx.store(&self.tenant);
        let committed_free = store.save(&self.committed, ctx.config.universe)?;
        if self.draft.is_some() {
            self.recompute(ctx)?;
        } else {
            self.free = committed_free;
        }
        Ok(())
    }

    async fn push_remote(&mut self, ctx: &ChannelContext) -> Result<(), ChannelError> {
        let config = TenantChannelConfig::from(&self.committed);
        match ctx.remote.update(&self.tenant, &config).await {
            Ok(()) => {
                self.sync = SyncStatus::default();
                Ok(())
            }
            Err(e) => {
                self.sync.pending = true;
                self.sync.attempts += 1;
                self.sync.last_error = Some(e.to_string());
                Err(ChannelError::RemoteSync(e))
            }
        }
    }

    /// Remote push whose failure is logged and recorded, never returned.
    async fn push_best_effort(&mut self, ctx: &ChannelContext) {
        if let Err(e) = self.push_remote(ctx).await {
            warn!(tenant = %self.tenant, error = %e, "Remote channel update failed, kept locally");
        }
    }

    /// Read-modify-write of the committed iddle set for `channel`, mirrored into an open draft.
    ///
    /// A channel the draft has disabled stays disabled there; saving the draft takes it out of
    /// service regardless of the reservation.
    async fn modify_committed(
        &mut self,
        ctx: &ChannelContext,
        channel: ChannelId,
        op: impl Fn(&mut ChannelState) -> bool,
    ) -> Result<ChannelSnapshot, ChannelError> {
        self.committed = ctx.store(&self.tenant).load();
        let changed = op(&mut self.committed);
        if let Some(draft) = self.draft.as_mut() {
            if draft.status_of(channel) == ChannelStatus::Disabled {
                debug!(tenant = %self.tenant, channel, "Channel disabled in draft, not mirrored");
            } else {
                op(draft);
            }
        }
        self.persist_local(ctx)?;
        if changed {
            self.push_best_effort(ctx).await;
        }
        Ok(self.snapshot())
    }

    async fn retry_sync(&mut self, ctx: &ChannelContext) -> Result<SyncStatus, ChannelError> {
        if !self.sync.pending {
            return Ok(self.sync.clone());
        }
        let policy = &ctx.config.remote_sync;
        let mut attempt = 1;
        loop {
            match self.push_remote(ctx).await {
                Ok(()) => {
                    info!(tenant = %self.tenant, attempt, "Remote channel state synced");
                    return Ok(self.sync.clone());
                }
                Err(e) if attempt >= policy.max_attempts => {
                    warn!(tenant = %self.tenant, attempt, error = %e, "Giving up remote sync");
                    return Err(e);
                }
                Err(e) => {
                    let delay = policy.backoff(attempt);
                    debug!(tenant = %self.tenant, attempt, ?delay, error = %e, "Remote sync failed, backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl ActorEntity for ChannelBoard {
    type Id = TenantId;
    type Create = ChannelsCreate;
    type Update = ChannelsUpdate;
    type Action = ChannelAction;
    type ActionResult = ChannelActionResult;
    type Context = ChannelContext;
    type Error = ChannelError;

    fn from_create_params(id: TenantId, params: ChannelsCreate) -> Result<Self, Self::Error> {
        Ok(Self::new(id, ChannelState::new(params.channels, &[], &[])))
    }

    /// First use of a tenant: whatever the cache holds, defaults when it holds nothing usable.
    async fn on_open(id: TenantId, ctx: &ChannelContext) -> Result<Self, Self::Error> {
        ctx.claim_keys(&id)?;
        let committed = ctx.store(&id).load();
        let mut board = Self::new(id, committed);
        board.free = board.committed.free(ctx.config.universe);
        Ok(board)
    }

    /// Provisioning must reach the remote store; nothing is cached if it does not.
    async fn on_create(&mut self, ctx: &ChannelContext) -> Result<(), Self::Error> {
        ctx.claim_keys(&self.tenant)?;
        let config = TenantChannelConfig::from(&self.committed);
        let result = match ctx.remote.update(&self.tenant, &config).await {
            Ok(()) => self.persist_local(ctx),
            Err(e) => Err(e.into()),
        };
        if result.is_err() {
            ctx.release_keys(&self.tenant);
        }
        result
    }

    async fn on_update(
        &mut self,
        update: ChannelsUpdate,
        ctx: &ChannelContext,
    ) -> Result<(), Self::Error> {
        let draft = self.draft_mut();
        if let Some(channels) = update.channels {
            draft.channels = channels;
        }
        if let Some(iddle) = update.iddle {
            draft.iddle = ChannelSet::from(iddle);
        }
        if let Some(disabled) = update.disabled {
            draft.disabled = ChannelSet::from(disabled);
        }
        self.recompute(ctx)?;
        Ok(())
    }

    async fn on_delete(&self, ctx: &ChannelContext) -> Result<(), Self::Error> {
        if self.sync.pending {
            warn!(tenant = %self.tenant, "Evicting board with unsynced changes");
        }
        if self.draft.is_some() {
            debug!(tenant = %self.tenant, "Evicting board with an unsaved draft");
        }
        ctx.release_keys(&self.tenant);
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: ChannelAction,
        ctx: &ChannelContext,
    ) -> Result<ChannelActionResult, Self::Error> {
        match action {
            ChannelAction::Toggle(id) => {
                let status = self.draft_mut().toggle(id);
                debug!(tenant = %self.tenant, channel = id, %status, "Toggled in draft");
                self.recompute(ctx)?;
                Ok(ChannelActionResult::Toggle(status))
            }
            ChannelAction::Status(id) => {
                Ok(ChannelActionResult::Status(self.effective().status_of(id)))
            }
            ChannelAction::Reserve(id) => {
                let snapshot = self.modify_committed(ctx, id, |s| s.reserve(id)).await?;
                Ok(ChannelActionResult::Reserve(snapshot))
            }
            ChannelAction::Free(id) => {
                let snapshot = self.modify_committed(ctx, id, |s| s.release(id)).await?;
                Ok(ChannelActionResult::Free(snapshot))
            }
            ChannelAction::ReserveNext => {
                let latest = ctx.store(&self.tenant).load();
                let draft = self.draft.as_ref();
                // Skip channels the admin is about to take out of the pool
                let next = latest
                    .free(ctx.config.universe)
                    .into_iter()
                    .find(|&id| draft.map_or(true, |d| d.status_of(id) == ChannelStatus::Free));
                match next {
                    Some(id) => {
                        self.modify_committed(ctx, id, |s| s.reserve(id)).await?;
                        Ok(ChannelActionResult::ReserveNext(Some(id)))
                    }
                    None => {
                        debug!(tenant = %self.tenant, "No free channel left");
                        Ok(ChannelActionResult::ReserveNext(None))
                    }
                }
            }
            ChannelAction::Recompute => Ok(ChannelActionResult::Recompute(self.recompute(ctx)?)),
            ChannelAction::Save => {
                if let Some(draft) = self.draft.take() {
                    self.committed = draft;
                }
                self.persist_local(ctx)?;
                self.push_remote(ctx).await?;
                info!(tenant = %self.tenant, channels = self.committed.channels, "Channel configuration saved");
                Ok(ChannelActionResult::Save(self.snapshot()))
            }
            ChannelAction::Reset => {
                self.draft = None;
                self.committed = ctx.store(&self.tenant).load();
                self.recompute(ctx)?;
                Ok(ChannelActionResult::Reset(self.snapshot()))
            }
            ChannelAction::Pull => {
                let found = match ctx.remote.fetch(&self.tenant).await? {
                    Some(config) => {
                        self.committed = ChannelState::from(config);
                        self.draft = None;
                        self.sync = SyncStatus::default();
                        self.persist_local(ctx)?;
                        true
                    }
                    None => {
                        debug!(tenant = %self.tenant, "No remote channel record, keeping local state");
                        false
                    }
                };
                Ok(ChannelActionResult::Pull {
                    found,
                    snapshot: self.snapshot(),
                })
            }
            ChannelAction::RetrySync => Ok(ChannelActionResult::RetrySync(self.retry_sync(ctx).await?)),
            ChannelAction::Snapshot => Ok(ChannelActionResult::Snapshot(self.snapshot())),
        }
    }
}
