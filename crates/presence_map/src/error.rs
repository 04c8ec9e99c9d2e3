//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants
//! follow the failure taxonomy of the visualization: fatal initialization and mask failures,
//! live channel failures, invalid configuration, IO, and generic errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Boundary asset missing, unreachable, malformed, or without usable paths.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// Rasterizing the boundary produced no usable mask.
    #[error("mask build failed: {0}")]
    MaskBuild(String),

    /// Transport-level failure on the live count channel.
    #[error("channel error: {0}")]
    Channel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns `true` for errors that stop the visualization before any point is placed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Initialization(_) | Error::MaskBuild(_) | Error::InvalidConfig(_)
        )
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
