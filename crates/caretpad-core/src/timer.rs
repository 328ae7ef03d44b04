//! Cooperative, single-threaded timers.
//!
//! Nothing here spawns threads or sleeps. A [`TimerQueue`] only remembers
//! deadlines; the host's frame loop calls [`TimerQueue::advance_to`] and runs
//! whatever came due. Each [`TimerId`] has at most one pending deadline.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// The deferred work kinds a session schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerId {
    CaretBlink,
    Redraw,
    Autosave,
}

/// Schedule-after-duration, cancellable.
pub trait Scheduler {
    /// Arms `id` to fire `after` from now, replacing any pending deadline.
    fn schedule(&mut self, id: TimerId, after: Duration);
    /// Disarms `id`. Cancelling an idle timer is a no-op.
    fn cancel(&mut self, id: TimerId);
    fn is_pending(&self, id: TimerId) -> bool;
}

/// Deadline table driven by an externally supplied clock.
#[derive(Debug, Clone)]
pub struct TimerQueue {
    now: Instant,
    deadlines: HashMap<TimerId, Instant>,
}

impl TimerQueue {
    /// Creates an empty queue whose clock starts at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            now,
            deadlines: HashMap::new(),
        }
    }

    /// The queue's notion of the current time.
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Moves the clock forward and returns the timers that came due, earliest first.
    ///
    /// Fired timers are disarmed; repeating work re-arms itself when handled.
    /// A `now` earlier than the current clock is ignored.
    pub fn advance_to(&mut self, now: Instant) -> Vec<TimerId> {
        if now > self.now {
            self.now = now;
        }
        let mut due: Vec<(Instant, TimerId)> = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= self.now)
            .map(|(&id, &at)| (at, id))
            .collect();
        due.sort();
        for (_, id) in &due {
            self.deadlines.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Time left until the earliest deadline (zero if already due).
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|at| at.saturating_duration_since(self.now))
    }

    /// Disarms everything. Used when a session is torn down.
    pub fn cancel_all(&mut self) {
        if !self.deadlines.is_empty() {
            tracing::debug!(pending = self.deadlines.len(), "cancelling all timers");
        }
        self.deadlines.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.deadlines.len()
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, id: TimerId, after: Duration) {
        self.deadlines.insert(id, self.now + after);
    }

    fn cancel(&mut self, id: TimerId) {
        self.deadlines.remove(&id);
    }

    fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }
}
