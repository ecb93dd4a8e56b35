//! # System Lifecycle
//!
//! Starting, wiring and stopping the channel service.
//!
//! - [`ChannelSystem`] creates the channel actor, injects its [`ChannelContext`]
//!   (cache, remote store, config) at `run()` time, and shuts it down by dropping the client.
//! - [`setup_tracing`] initializes structured logging.
//!
//! [`ChannelContext`]: crate::channel_actor::ChannelContext

pub mod channel_system;
pub mod tracing;

pub use self::channel_system::*;
pub use self::tracing::*;
