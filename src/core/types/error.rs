//! Error types for cached and uncached remote reads

use thiserror::Error;

/// Errors surfaced by the read paths.
///
/// `Remote` carries the opaque failure payload reported by the remote
/// source; the cache stores and forwards it without inspecting it, and a
/// page's fetch failure is replayed to every later reader of that page
/// until the next invalidation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("remote read failed: {0}")]
    Remote(String),

    #[error("invalid memory address: {0}")]
    InvalidAddress(String),

    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("page fetch interrupted before completion")]
    Interrupted,

    #[error("unexpected value kind: {0}")]
    UnexpectedKind(String),
}

/// Result type alias for read operations
pub type ReadResult<T> = Result<T, ReadError>;

impl ReadError {
    /// Wraps an opaque failure payload from the remote source
    pub fn remote(payload: impl Into<String>) -> Self {
        ReadError::Remote(payload.into())
    }

    /// Creates a short read error
    pub fn short_read(expected: usize, actual: usize) -> Self {
        ReadError::ShortRead { expected, actual }
    }
}
