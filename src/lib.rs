//! # EchoBox Channels
//!
//! > **Radio-channel reconciliation for tour-equipment rental back-offices.**
//!
//! Every tenant owns a pool of radio channels. Each channel is **free** (assignable to an
//! order), **iddle** (reserved, usually in use by an active order) or **disabled** (taken out of
//! service by an admin). This crate keeps that partition per tenant, recomputes the free list
//! whenever its inputs change, and mirrors the state to a local cache and a remote tenant record.
//!
//! ## 🏗️ Design
//!
//! ### One actor, many tenants
//! All boards live inside a single [`ResourceActor`](framework::ResourceActor). Admin toggles
//! and order-flow reserve/free calls become messages on one queue, so their read-modify-write
//! cycles never interleave within the process.
//!
//! ### `free` is derived
//! Only `N`, `iddle` and `disabled` are state. `free` is recomputed on every change and cached
//! for display, never read back as truth.
//!
//! ### Draft vs committed
//! Admin edits go to a draft; `save` commits it locally and remotely and is the only step that
//! reports remote failures. Order-flow reserve/free commit at once and push to the remote store
//! best-effort, leaving an "unsynced" flag behind on failure.
//!
//! ## 🗺️ Module Tour
//!
//! - [`model`]: pure types: [`ChannelState`](model::ChannelState),
//!   [`ChannelUniverse`](model::ChannelUniverse), [`free_channels`](model::free_channels).
//! - [`cache`]: the local key/value cache and [`ChannelStore`](cache::ChannelStore), the only
//!   code that knows the cache keys.
//! - [`remote`]: the [`TenantRecordStore`](remote::TenantRecordStore) seam.
//! - [`framework`]: the generic actor, client and mocks.
//! - [`channel_actor`]: [`ChannelBoard`](channel_actor::ChannelBoard), its actions and errors.
//! - [`clients`]: [`ChannelClient`](clients::ChannelClient), the API callers use.
//! - [`lifecycle`]: [`ChannelSystem`](lifecycle::ChannelSystem) and tracing setup.
//! - [`config`]: TOML configuration.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod cache;
pub mod channel_actor;
pub mod clients;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod remote;
