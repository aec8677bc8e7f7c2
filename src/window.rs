// src/window.rs

// per-client sliding window of recent request timestamps

// dependencies
use std::collections::VecDeque;

// upfront reservation per client; larger limits grow on demand
const INITIAL_RESERVE: usize = 16;

/// Bounded, oldest-first sequence of admitted request instants (nanoseconds).
///
/// Timestamps are appended at the back and only ever removed from the front,
/// and they never decrease, so the front is always the oldest live request.
#[derive(Debug, Clone)]
pub(crate) struct ClientWindow {
    timestamps: VecDeque<u64>,
    capacity: usize,
}

impl ClientWindow {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(capacity.min(INITIAL_RESERVE)),
            capacity,
        }
    }

    // drop every timestamp that has left the window at `now`; returns how many went
    pub(crate) fn evict_expired(&mut self, now: u64, window_nanos: u64) -> usize {
        let mut evicted = 0;
        while let Some(&oldest) = self.timestamps.front() {
            if oldest.saturating_add(window_nanos) > now {
                break;
            }
            self.timestamps.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Append `now` unless the window is full.
    ///
    /// An instant earlier than the newest recorded one is clamped up to it so
    /// the ordering invariant holds. Returns `false` without touching the
    /// window when capacity is reached.
    pub(crate) fn try_record(&mut self, now: u64) -> bool {
        if self.timestamps.len() >= self.capacity {
            return false;
        }
        let at = self.newest().map_or(now, |newest| newest.max(now));
        self.timestamps.push_back(at);
        true
    }

    pub(crate) fn oldest(&self) -> Option<u64> {
        self.timestamps.front().copied()
    }

    pub(crate) fn newest(&self) -> Option<u64> {
        self.timestamps.back().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.timestamps.len() >= self.capacity
    }

    pub(crate) fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.timestamps.len())
    }

    /// Idle when empty, or when the oldest request is strictly before `cutoff`.
    pub(crate) fn is_idle_since(&self, cutoff: u64) -> bool {
        self.oldest().is_none_or(|oldest| oldest < cutoff)
    }

    /// Whether the newest request still counts against the quota at `now`.
    pub(crate) fn has_live_request(&self, now: u64, window_nanos: u64) -> bool {
        self.newest()
            .is_some_and(|newest| newest.saturating_add(window_nanos) > now)
    }
}
