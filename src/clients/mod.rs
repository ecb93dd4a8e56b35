//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient).

pub mod actor_client;
pub mod channel_client;

pub use actor_client::*;
pub use channel_client::*;
