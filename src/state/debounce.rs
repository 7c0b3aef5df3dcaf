/// Quiescence-window debouncer for slider input
///
/// Pure timing logic: no timers, no UI, and the clock is passed in. The
/// caller schedules a wakeup for each ticket and asks `settle_at` whether
/// the value may be committed.
/// Only the most recent ticket can ever settle, so a burst of N inputs
/// yields exactly one committed value (the last one).

use std::time::{Duration, Instant};

/// Default quiescence window
pub const DEBOUNCE_MS: u64 = 300;

/// Identifies one `push`; stale tickets never settle
pub type Ticket = u64;

#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<T>,
    last_input: Option<Instant>,
    ticket: Ticket,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            last_input: None,
            ticket: 0,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a new value and restart the quiescence window
    pub fn push_at(&mut self, value: T, now: Instant) -> Ticket {
        self.ticket += 1;
        self.pending = Some(value);
        self.last_input = Some(now);
        self.ticket
    }

    /// Take the pending value if `ticket` is the latest and input has been quiet
    pub fn settle_at(&mut self, ticket: Ticket, now: Instant) -> Option<T> {
        if !self.is_current(ticket) {
            return None;
        }

        let last_input = self.last_input?;
        if now.saturating_duration_since(last_input) < self.window {
            return None;
        }

        self.last_input = None;
        self.pending.take()
    }

    /// Whether `ticket` belongs to the most recent push
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket == self.ticket
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before the latest push may settle
    pub fn remaining_at(&self, now: Instant) -> Duration {
        let Some(last_input) = self.last_input else {
            return Duration::ZERO;
        };
        self.window
            .saturating_sub(now.saturating_duration_since(last_input))
    }

    /// Drop any pending value and invalidate outstanding tickets
    pub fn cancel(&mut self) {
        self.ticket += 1;
        self.pending = None;
        self.last_input = None;
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEBOUNCE_MS))
    }
}
