//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by `RUST_LOG`.
//!
//! ```bash
//! RUST_LOG=info cargo run     # lifecycle and per-request outcomes
//! RUST_LOG=debug cargo run    # payloads, cache misses, malformed cache values
//! RUST_LOG=echobox_channels::cache=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a reserve from the order flow reads:
//!
//! ```text
//! INFO Opened entity_type="ChannelBoard" id=acme size=1
//! INFO Action ok entity_type="ChannelBoard" id=acme
//! ```
//!
//! and a failed best-effort remote write adds
//!
//! ```text
//! WARN Remote channel update failed, kept locally tenant=acme error=Remote sync failed: ...
//! ```
//!
//! Module paths are hidden (`with_target(false)`); the `entity_type` and `tenant` fields carry
//! the context instead.
pub fn setup_tracing() {
    // try_init: tests and embedders may have installed a subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
