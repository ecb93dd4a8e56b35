//! Channel partition model: the universe of ids, the `iddle` / `disabled` sets and the derived
//! `free` list.
//!
//! Everything in this module is pure. Persistence lives in [`crate::cache`] and
//! [`crate::remote`]; the actor wiring lives in [`crate::channel_actor`].

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier of a radio channel.
///
/// Signed on purpose: negative ids found in stored data are kept as-is and simply never match a
/// generated channel.
pub type ChannelId = i64;

/// Largest channel count a universe is built for. Larger stored counts are clamped to it.
pub const MAX_CHANNEL_COUNT: i64 = 65_535;

/// Which ids a channel count `N` spans.
///
/// Every variant yields an empty universe for `N < 0`. `N` above [`MAX_CHANNEL_COUNT`] is treated
/// as `MAX_CHANNEL_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelUniverse {
    /// `{0, 1, ..., N}`: `N + 1` channels. What existing tenant data was written against.
    #[default]
    InclusiveZero,
    /// `{0, 1, ..., N - 1}`
    ZeroBased,
    /// `{1, 2, ..., N}`
    OneBased,
}

impl ChannelUniverse {
    /// Channel ids for a count of `n`, ascending.
    pub fn ids(self, n: i64) -> std::ops::RangeInclusive<ChannelId> {
        let n = n.min(MAX_CHANNEL_COUNT);
        match self {
            Self::InclusiveZero => 0..=n,
            Self::ZeroBased => 0..=n.saturating_sub(1),
            Self::OneBased => 1..=n,
        }
    }
}

/// An ordered list of channel ids with set semantics.
///
/// Inserting an id that is already present is a no-op; insertion order is preserved so the
/// stored arrays read the same as before an operation that did not touch them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChannelSet(Vec<ChannelId>);

impl ChannelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: ChannelId) -> bool {
        self.0.contains(&id)
    }

    /// Adds `id`; returns `false` if it was already present.
    pub fn insert(&mut self, id: ChannelId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Removes every occurrence of `id`; returns `false` if it was absent.
    pub fn remove(&mut self, id: ChannelId) -> bool {
        let before = self.0.len();
        self.0.retain(|&c| c != id);
        self.0.len() != before
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[ChannelId] {
        &self.0
    }
}

/// Keeps the first occurrence of each id, so duplicated stored arrays still behave as sets.
impl FromIterator<ChannelId> for ChannelSet {
    fn from_iter<I: IntoIterator<Item = ChannelId>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl<'de> Deserialize<'de> for ChannelSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<ChannelId>::deserialize(deserializer).map(Self::from)
    }
}

impl From<Vec<ChannelId>> for ChannelSet {
    fn from(ids: Vec<ChannelId>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<&[ChannelId]> for ChannelSet {
    fn from(ids: &[ChannelId]) -> Self {
        ids.iter().copied().collect()
    }
}

/// `free = universe(n) - iddle - disabled`, ascending.
pub fn free_channels(
    universe: ChannelUniverse,
    n: i64,
    iddle: &ChannelSet,
    disabled: &ChannelSet,
) -> Vec<ChannelId> {
    universe
        .ids(n)
        .filter(|&id| !iddle.contains(id) && !disabled.contains(id))
        .collect()
}

/// Where a single channel currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    Free,
    Iddle,
    Disabled,
}

impl ChannelStatus {
    /// One step of the admin toggle cycle: free -> iddle -> disabled -> free.
    pub fn next(self) -> Self {
        match self {
            Self::Free => Self::Iddle,
            Self::Iddle => Self::Disabled,
            Self::Disabled => Self::Free,
        }
    }
}

impl Display for ChannelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Free => "free",
            Self::Iddle => "iddle",
            Self::Disabled => "disabled",
        };
        f.write_str(s)
    }
}

/// The stored triple for one tenant: channel count plus the two excluded sets.
///
/// `free` is deliberately not a field; call [`ChannelState::free`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelState {
    pub channels: i64,
    pub iddle: ChannelSet,
    pub disabled: ChannelSet,
}

impl ChannelState {
    pub fn new(channels: i64, iddle: &[ChannelId], disabled: &[ChannelId]) -> Self {
        Self {
            channels,
            iddle: iddle.into(),
            disabled: disabled.into(),
        }
    }

    pub fn free(&self, universe: ChannelUniverse) -> Vec<ChannelId> {
        free_channels(universe, self.channels, &self.iddle, &self.disabled)
    }

    /// Current status of `id`. An id found in both sets reports `Iddle`.
    pub fn status_of(&self, id: ChannelId) -> ChannelStatus {
        if self.iddle.contains(id) {
            ChannelStatus::Iddle
        } else if self.disabled.contains(id) {
            ChannelStatus::Disabled
        } else {
            ChannelStatus::Free
        }
    }

    /// Moves `id` to `status`, clearing it from whichever set held it.
    pub fn set_status(&mut self, id: ChannelId, status: ChannelStatus) {
        self.iddle.remove(id);
        self.disabled.remove(id);
        match status {
            ChannelStatus::Free => {}
            ChannelStatus::Iddle => {
                self.iddle.insert(id);
            }
            ChannelStatus::Disabled => {
                self.disabled.insert(id);
            }
        }
    }

    /// Advances `id` one step through the toggle cycle and returns its new status.
    pub fn toggle(&mut self, id: ChannelId) -> ChannelStatus {
        let next = self.status_of(id).next();
        self.set_status(id, next);
        next
    }

    /// Marks `id` as in use. Idempotent; returns whether anything changed.
    pub fn reserve(&mut self, id: ChannelId) -> bool {
        self.iddle.insert(id)
    }

    /// Releases `id`. Idempotent; returns whether anything changed.
    pub fn release(&mut self, id: ChannelId) -> bool {
        self.iddle.remove(id)
    }
}
