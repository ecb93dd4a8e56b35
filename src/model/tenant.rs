//! Tenant-scoped types: the tenant id and the remote channel record.

use crate::model::{ChannelSet, ChannelState};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier of a tenant (the id of its document in the remote store).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TenantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The channel fields of a tenant document, as stored remotely.
///
/// ```json
/// { "channelsNum": 12, "iddleChannels": [1, 4], "disabledChannels": [11] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantChannelConfig {
    #[serde(default)]
    pub channels_num: i64,
    #[serde(default)]
    pub iddle_channels: ChannelSet,
    #[serde(default)]
    pub disabled_channels: ChannelSet,
}

impl From<&ChannelState> for TenantChannelConfig {
    fn from(state: &ChannelState) -> Self {
        Self {
            channels_num: state.channels,
            iddle_channels: state.iddle.clone(),
            disabled_channels: state.disabled.clone(),
        }
    }
}

impl From<TenantChannelConfig> for ChannelState {
    fn from(config: TenantChannelConfig) -> Self {
        Self {
            channels: config.channels_num,
            iddle: config.iddle_channels,
            disabled: config.disabled_channels,
        }
    }
}
