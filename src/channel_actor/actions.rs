//! Custom actions for the channel board actor.
//!
//! Each [`ChannelAction`] variant has a matching [`ChannelActionResult`] variant; the
//! [`ChannelClient`](crate::clients::ChannelClient) unwraps them into plain return types.

use crate::model::{ChannelId, ChannelStatus, TenantId};
use serde::Serialize;

/// Payload for provisioning a tenant's channel board.
#[derive(Debug, Clone)]
pub struct ChannelsCreate {
    pub channels: i64,
}

/// Bulk edit of the draft (the admin modal's count field and list editors).
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ChannelsUpdate {
    pub channels: Option<i64>,
    pub iddle: Option<Vec<ChannelId>>,
    pub disabled: Option<Vec<ChannelId>>,
}

/// Operations on a board beyond create/open/update/delete.
#[derive(Debug, Clone)]
pub enum ChannelAction {
    /// Advance one channel through free -> iddle -> disabled in the draft.
    Toggle(ChannelId),
    /// Report one channel's status in the effective state.
    Status(ChannelId),
    /// Mark a channel as in use by an order.
    Reserve(ChannelId),
    /// Release a channel held by an order.
    Free(ChannelId),
    /// Reserve the lowest free channel, if any.
    ReserveNext,
    /// Recompute the free list and write it to the cache.
    Recompute,
    /// Commit the draft locally and remotely.
    Save,
    /// Drop the draft and re-read the cache.
    Reset,
    /// Replace local state with the remote tenant record.
    Pull,
    /// Push committed state to the remote store if a previous push failed.
    RetrySync,
    Snapshot,
}

/// Results from [`ChannelAction`]s, 1:1 with the action variants.
#[derive(Debug, Clone)]
pub enum ChannelActionResult {
    Toggle(ChannelStatus),
    Status(ChannelStatus),
    Reserve(ChannelSnapshot),
    Free(ChannelSnapshot),
    ReserveNext(Option<ChannelId>),
    Recompute(Vec<ChannelId>),
    Save(ChannelSnapshot),
    Reset(ChannelSnapshot),
    /// `found` is false when the tenant has no remote record; local state is then kept.
    Pull { found: bool, snapshot: ChannelSnapshot },
    RetrySync(SyncStatus),
    Snapshot(ChannelSnapshot),
}

/// Remote sync bookkeeping for one board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    /// Committed state has changes the remote store has not accepted yet.
    pub pending: bool,
    pub last_error: Option<String>,
    /// Failed push attempts since the last success.
    pub attempts: u32,
}

/// Read-only view of a board, as the admin screens consume it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSnapshot {
    pub tenant: TenantId,
    pub channels: i64,
    pub iddle: Vec<ChannelId>,
    pub disabled: Vec<ChannelId>,
    pub free: Vec<ChannelId>,
    /// A draft with unsaved toggles is open.
    pub editing: bool,
    pub sync: SyncStatus,
}
