//! Policy error types.

use thiserror::Error;

/// Policy errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A policy file exists but is not a valid pattern document.
    #[error("failed to parse policy: {0}")]
    Parse(String),

    /// A hook request could not be decoded.
    #[error("Invalid JSON input: {0}")]
    Request(#[from] serde_json::Error),

    /// An I/O error occurred while reading policy.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
