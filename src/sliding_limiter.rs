// src/sliding_limiter.rs

// sliding-limiter: a per-client sliding window log rate limiter.

// dependencies
use crate::clock::{Clock, NANOS_PER_MINUTE, NANOS_PER_SECOND, SystemClock};
use crate::config::SlidingLimiterConfig;
use crate::errors::{Result, SlidingLimiterError};
use crate::window::ClientWindow;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// The main SlidingLimiter model.
/// T is the type used to identify clients (e.g., `&str`, `String`, an IP rendered as text).
/// C is the clock type, defaulting to SystemClock.
/// We use `Arc<DashMap>` for sharded, per-key locking of client windows: every
/// evict-check-append sequence runs under the write guard of the client's entry,
/// so requests from one client are linearizable while other clients proceed.
#[derive(Debug)]
pub struct SlidingLimiter<T, C = SystemClock>
where
    T: Hash + Eq + Clone + AsRef<str>,
    C: Clock,
{
    window_nanos: u64,
    max_requests: usize,
    idle_cleanup_nanos: u64,
    client_state: Arc<DashMap<T, ClientWindow>>,
    clock: C,
}

// methods for the SlidingLimiter type
impl<T, C> SlidingLimiter<T, C>
where
    T: Hash + Eq + Clone + AsRef<str>,
    C: Clock,
{
    // method to create a new limiter from already validated settings
    fn new(config: &SlidingLimiterConfig, clock: C) -> Self {
        Self {
            window_nanos: config.window_minutes.saturating_mul(NANOS_PER_MINUTE),
            max_requests: config.max_requests,
            idle_cleanup_nanos: config.idle_cleanup_minutes.saturating_mul(NANOS_PER_MINUTE),
            client_state: Arc::new(DashMap::new()),
            clock,
        }
    }

    // method to create a new rate limiter from a config object
    pub fn with_config(config: SlidingLimiterConfig, clock: C) -> Result<Self> {
        config.validate()?;
        debug!(
            window_minutes = config.window_minutes,
            max_requests = config.max_requests,
            idle_cleanup_minutes = config.idle_cleanup_minutes,
            "Creating sliding window limiter"
        );
        Ok(Self::new(&config, clock))
    }

    // accessor method to return the window length in minutes
    pub fn window_minutes(&self) -> u64 {
        self.window_nanos / NANOS_PER_MINUTE
    }

    // accessor method to return the per-window request limit
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    // accessor method to return the configured idle cleanup threshold in minutes
    pub fn idle_cleanup_minutes(&self) -> u64 {
        self.idle_cleanup_nanos / NANOS_PER_MINUTE
    }

    /// Number of clients currently holding a window.
    pub fn client_count(&self) -> usize {
        self.client_state.len()
    }

    /// Whether any state is held for `client_id`.
    pub fn contains_client<Q>(&self, client_id: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.client_state.contains_key(client_id)
    }

    /// Number of timestamps currently recorded for `client_id`.
    ///
    /// Expired timestamps are only stripped when the client next makes a
    /// request, so this may include requests that have already left the window.
    pub fn recorded_requests<Q>(&self, client_id: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.client_state.get(client_id).map(|window| window.len())
    }

    /// Decide whether a request from `client_id` is admitted right now.
    ///
    /// The clock is read exactly once, before any state is touched. A clock
    /// failure is returned to the caller and leaves all windows unchanged.
    pub fn check_request(&self, client_id: T) -> Result<SlidingLimiterDecision> {
        if client_id.as_ref().is_empty() {
            return Err(SlidingLimiterError::EmptyClientId);
        }
        let now = self.clock.now()?;
        self.check_request_at(client_id, now)
    }

    /// Decide whether a request from `client_id` observed at `now` (nanoseconds
    /// from the clock's origin) is admitted.
    pub fn check_request_at(&self, client_id: T, now: u64) -> Result<SlidingLimiterDecision> {
        if client_id.as_ref().is_empty() {
            return Err(SlidingLimiterError::EmptyClientId);
        }

        // the entry guard holds this client's shard lock until the decision is made
        let mut window = match self.client_state.entry(client_id) {
            Entry::Occupied(entry) => entry.into_ref(),
            Entry::Vacant(entry) => {
                debug!(
                    client = entry.key().as_ref(),
                    capacity = self.max_requests,
                    "Creating client window"
                );
                entry.insert(ClientWindow::new(self.max_requests))
            }
        };

        // a backwards step is treated as the newest recorded instant, for
        // eviction, retry-after and recording alike
        let now = match window.newest() {
            Some(newest) if newest > now => {
                warn!(
                    client = window.key().as_ref(),
                    newest, now, "Request instant precedes recorded history, clamping"
                );
                newest
            }
            _ => now,
        };

        let evicted = window.evict_expired(now, self.window_nanos);

        if window.is_full() {
            let retry_after_nanos = window
                .oldest()
                .map_or(self.window_nanos, |oldest| {
                    oldest.saturating_add(self.window_nanos).saturating_sub(now)
                });
            let retry_after_seconds = retry_after_nanos / NANOS_PER_SECOND;

            debug!(
                client = window.key().as_ref(),
                retry_after_seconds, "Rate limit exceeded"
            );
            return Ok(SlidingLimiterDecision::rejected(retry_after_seconds));
        }

        if !window.try_record(now) {
            // unreachable while the fullness check above holds; never corrupt the window
            let retry_after_seconds = self.window_nanos / NANOS_PER_SECOND;
            warn!(
                client = window.key().as_ref(),
                retry_after_seconds, "Client window refused a record below the limit"
            );
            return Ok(SlidingLimiterDecision::rejected(retry_after_seconds));
        }

        let remaining_quota = window.remaining();
        trace!(
            client = window.key().as_ref(),
            evicted, remaining_quota, "Request admitted"
        );

        Ok(SlidingLimiterDecision::admitted(remaining_quota))
    }

    /// Drop every client idle for longer than the configured cleanup threshold.
    /// Returns the number of entries removed.
    pub fn cleanup_stale_clients(&self) -> Result<usize> {
        let now = self.clock.now()?;
        Ok(self.sweep(self.idle_cleanup_nanos, now))
    }

    /// Drop every client whose oldest recorded request is more than
    /// `max_idle_minutes` old and whose requests have all left the rate limit
    /// window. Returns the number of entries removed.
    pub fn cleanup_idle_for(&self, max_idle_minutes: u64) -> Result<usize> {
        let now = self.clock.now()?;
        Ok(self.cleanup_idle_for_at(max_idle_minutes, now))
    }

    /// As [`cleanup_idle_for`](Self::cleanup_idle_for), at an explicit instant.
    pub fn cleanup_idle_for_at(&self, max_idle_minutes: u64, now: u64) -> usize {
        self.sweep(max_idle_minutes.saturating_mul(NANOS_PER_MINUTE), now)
    }

    // method to clean up stale clients
    fn sweep(&self, max_idle_nanos: u64, now: u64) -> usize {
        info!(
            max_idle_minutes = max_idle_nanos / NANOS_PER_MINUTE,
            "Rate limit cleanup started"
        );

        if self.client_state.is_empty() {
            return 0;
        }

        // retain checks each window under its shard's write lock, so an entry
        // refreshed by a concurrent request is seen with its new timestamps.
        // A window still holding a live request is kept whatever its age.
        let cutoff = now.saturating_sub(max_idle_nanos);
        let mut removed = 0;
        self.client_state.retain(|_, window| {
            let keep =
                !window.is_idle_since(cutoff) || window.has_live_request(now, self.window_nanos);
            if !keep {
                removed += 1;
            }
            keep
        });

        info!(
            removed,
            retained = self.client_state.len(),
            "Rate limit cleanup finished"
        );
        removed
    }
}

/// Result of a rate limiting decision with metadata for HTTP responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlidingLimiterDecision {
    /// Whether the request should be allowed
    pub allowed: bool,
    /// Requests still admissible in the current window (0 when denied)
    pub remaining_quota: usize,
    /// Whole seconds until the client can make another request (0 when allowed)
    pub retry_after_seconds: u64,
}

impl SlidingLimiterDecision {
    pub(crate) fn admitted(remaining_quota: usize) -> Self {
        Self {
            allowed: true,
            remaining_quota,
            retry_after_seconds: 0,
        }
    }

    pub(crate) fn rejected(retry_after_seconds: u64) -> Self {
        Self {
            allowed: false,
            remaining_quota: 0,
            retry_after_seconds,
        }
    }
}
