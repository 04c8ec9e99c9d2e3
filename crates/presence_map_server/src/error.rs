use thiserror::Error;

/// Result type used throughout the server crate.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors of the presence counting service.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    /// The receiving side of a subscriber went away.
    #[error("subscriber is gone")]
    SubscriberGone,
}
