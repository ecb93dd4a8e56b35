//! Generic actor framework for per-tenant resources.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait a resource type implements to be managed by an actor
//! - [`ResourceActor`] - Generic actor that owns the entities and serializes every request
//! - [`ResourceClient`] - Cloneable, type-safe handle for sending requests
//! - [`FrameworkError`] - Errors raised by the plumbing rather than the entity
//!
//! # Testing
//!
//! See [`mock`] for utilities to test client wrappers without spawning an actor.

pub mod core;
pub mod mock;

pub use core::*;
