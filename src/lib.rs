// src/lib.rs

//! # Sliding Limiter
//!
//! A per-client sliding window rate limiter. Every admitted request is logged
//! with its timestamp; a client is admitted while fewer than `max_requests`
//! of its requests fall inside the trailing window.
//!
//! ## Quick Example
//!
//! ```rust
//! use sliding_limiter::{SlidingLimiter, SlidingLimiterConfig, SystemClock};
//!
//! // 100 requests per 3 minutes, forget clients idle for a day
//! let config = SlidingLimiterConfig::new(3, 100, 24 * 60);
//! let limiter = SlidingLimiter::with_config(config, SystemClock).unwrap();
//!
//! let decision = limiter.check_request("203.0.113.7").unwrap();
//! if decision.allowed {
//!     println!("Request allowed, {} left", decision.remaining_quota);
//! } else {
//!     println!("Rate limited - retry after {}s", decision.retry_after_seconds);
//! }
//!
//! // from a timer owned by the application
//! limiter.cleanup_stale_clients().unwrap();
//! ```

// private modules
mod clock;
mod config;
mod errors;
mod filter;
mod sliding_limiter;
mod window;

// public API exports
pub use clock::{Clock, ClockError, NANOS_PER_MINUTE, NANOS_PER_SECOND, SystemClock};
pub use config::SlidingLimiterConfig;
pub use errors::{Result, SlidingLimiterError};
pub use filter::{FilterOutcome, RateLimitFilter, Rejection, TOO_MANY_REQUESTS};
pub use sliding_limiter::{SlidingLimiter, SlidingLimiterDecision};
