//! Error types for boardkit operations.

use thiserror::Error;

use crate::ratelimit::RateLimitStats;

/// Main error type for boardkit operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoardkitError {
    /// Widget identity absent from the store
    #[error("widget '{0}' not found")]
    NotFound(String),

    /// An operation would need to place or shift a widget past the maximum
    /// representable rank
    #[error("no z-index available on top of widget '{0}'")]
    RankExhausted(String),

    /// Admission denied by the rate limiter; carries the stats the caller
    /// should surface as retry metadata
    #[error("rate limit exceeded, next reset at {}", .0.next_reset)]
    RateLimitExceeded(RateLimitStats),

    /// Configuration-related errors
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for boardkit operations.
pub type Result<T> = std::result::Result<T, BoardkitError>;
