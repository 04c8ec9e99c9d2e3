#![forbid(unsafe_code)]
//! Presence counting service: counts WebSocket subscribers and pushes the current
//! value to all of them as `{"type":"count","online":N}`.
pub mod config;
pub mod counter;
pub mod error;
pub mod server;

pub use config::ServerConfig;
pub use counter::{PresenceCounter, Subscriber, SubscriberId};
pub use error::{Result, ServerError};
pub use server::{routes, serve, SharedCounter};

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
