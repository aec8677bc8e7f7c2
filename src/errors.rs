// src/errors.rs

// error handling for the sliding limiter type

// dependencies
use thiserror::Error;

use crate::clock::ClockError;

/// Error type for SlidingLimiter configuration and clock issues.
///
/// A rejected request is not an error; it is reported through
/// [`SlidingLimiterDecision`](crate::SlidingLimiterDecision).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SlidingLimiterError {
    /// window length of zero minutes
    #[error("Window duration must be positive")]
    InvalidWindow,

    /// request limit of zero
    #[error("Max requests per window must be positive")]
    InvalidMaxRequests,

    /// idle cleanup threshold of zero minutes
    #[error("Idle cleanup threshold must be positive")]
    InvalidIdleThreshold,

    #[error("Client identifier must not be empty")]
    EmptyClientId,

    /// error variant for issues with the clock
    #[error("Clock error occurred: {0}")]
    Clock(#[from] ClockError),

    /// configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SlidingLimiter operations.
pub type Result<T> = std::result::Result<T, SlidingLimiterError>;
