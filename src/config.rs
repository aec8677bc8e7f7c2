// src/config.rs

//! Configuration types for the sliding limiter

// dependencies
use crate::errors::{Result, SlidingLimiterError};
use serde::Deserialize;
use std::path::Path;

/// Configuration for rate limiter behavior.
///
/// All three values are required and must be positive. The idle cleanup
/// threshold is independent of the rate limit window and is usually much
/// larger (a day, say, against a window of a few minutes).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlidingLimiterConfig {
    pub(crate) window_minutes: u64,
    pub(crate) max_requests: usize,
    pub(crate) idle_cleanup_minutes: u64,
}

impl SlidingLimiterConfig {
    /// Create a new configuration with window, limit and idle threshold settings
    pub fn new(window_minutes: u64, max_requests: usize, idle_cleanup_minutes: u64) -> Self {
        Self {
            window_minutes,
            max_requests,
            idle_cleanup_minutes,
        }
    }

    /// Builder-style: set the window length in minutes
    pub fn window_minutes(mut self, window_minutes: u64) -> Self {
        self.window_minutes = window_minutes;
        self
    }

    /// Builder-style: set the number of requests admitted per window
    pub fn max_requests(mut self, max_requests: usize) -> Self {
        self.max_requests = max_requests;
        self
    }

    /// Builder-style: set the idle threshold after which a client entry may be dropped
    pub fn idle_cleanup_minutes(mut self, idle_cleanup_minutes: u64) -> Self {
        self.idle_cleanup_minutes = idle_cleanup_minutes;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.window_minutes == 0 {
            return Err(SlidingLimiterError::InvalidWindow);
        }
        if self.max_requests == 0 {
            return Err(SlidingLimiterError::InvalidMaxRequests);
        }
        if self.idle_cleanup_minutes == 0 {
            return Err(SlidingLimiterError::InvalidIdleThreshold);
        }
        Ok(())
    }

    /// Parse and validate a configuration from YAML text.
    ///
    /// ```yaml
    /// window_minutes: 3
    /// max_requests: 100
    /// idle_cleanup_minutes: 1440
    /// ```
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: SlidingLimiterConfig = serde_yaml::from_str(contents)
            .map_err(|e| SlidingLimiterError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }
}
