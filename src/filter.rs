// src/filter.rs

//! Request boundary adapter.
//!
//! Sits in front of a request handler: extracts nothing itself, but takes the
//! client address the server already knows, asks the limiter for a decision
//! and tells the server either to forward the request or to answer with a
//! `429 Too Many Requests` rejection.

// dependencies
use crate::clock::{Clock, SystemClock};
use crate::errors::Result;
use crate::sliding_limiter::SlidingLimiter;
use std::sync::Arc;
use tracing::debug;

/// HTTP status sent with every rejection.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// What the server should do with an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Pass the request on unmodified.
    Forward { remaining_quota: usize },
    /// Answer immediately with the rejection.
    Reject(Rejection),
}

/// A ready-to-send rejection response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: u16,
    pub retry_after_seconds: u64,
}

impl Rejection {
    fn new(retry_after_seconds: u64) -> Self {
        Self {
            status: TOO_MANY_REQUESTS,
            retry_after_seconds,
        }
    }

    /// Response headers, in send order.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", "text/html".to_string()),
            ("Retry-After", self.retry_after_seconds.to_string()),
        ]
    }

    pub fn body(&self) -> String {
        format!("Try again in {} seconds", self.retry_after_seconds)
    }
}

/// Filter shared by every request-handling worker.
#[derive(Debug)]
pub struct RateLimitFilter<C = SystemClock>
where
    C: Clock,
{
    limiter: Arc<SlidingLimiter<String, C>>,
}

impl<C: Clock> Clone for RateLimitFilter<C> {
    fn clone(&self) -> Self {
        Self {
            limiter: Arc::clone(&self.limiter),
        }
    }
}

impl<C: Clock> RateLimitFilter<C> {
    pub fn new(limiter: Arc<SlidingLimiter<String, C>>) -> Self {
        Self { limiter }
    }

    pub fn limiter(&self) -> &SlidingLimiter<String, C> {
        &self.limiter
    }

    /// Check one inbound request from `remote_addr`.
    pub fn filter(&self, remote_addr: &str) -> Result<FilterOutcome> {
        let decision = self.limiter.check_request(remote_addr.to_string())?;

        if decision.allowed {
            return Ok(FilterOutcome::Forward {
                remaining_quota: decision.remaining_quota,
            });
        }

        debug!(
            client = remote_addr,
            retry_after_seconds = decision.retry_after_seconds,
            "Rejecting request"
        );
        Ok(FilterOutcome::Reject(Rejection::new(
            decision.retry_after_seconds,
        )))
    }

    /// Housekeeping entry point for the caller's timer, using the configured
    /// idle threshold. Returns the number of client entries dropped.
    pub fn run_cleanup(&self) -> Result<usize> {
        self.limiter.cleanup_stale_clients()
    }
}
