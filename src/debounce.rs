//! Cancel-and-reschedule delayed commit.
//!
//! The event loop owns the clock: callers pass `now` to `schedule` and `poll`,
//! and a periodic tick drives `poll`. At most one value is pending at a time.

use std::time::{Duration, Instant};

/// Delay before a filter edit is committed.
pub const FILTER_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the delay.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.delay, value));
    }

    /// Drops the pending value without firing.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }

    /// Returns the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_after_delay() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(500));
        d.schedule("J", t0);
        assert_eq!(d.poll(t0 + Duration::from_millis(499)), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(500)), Some("J"));
        assert!(!d.is_pending());
        assert_eq!(d.poll(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn reschedule_replaces_value_and_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(500));
        d.schedule("J", t0);
        d.schedule("Ja", t0 + Duration::from_millis(300));
        d.schedule("Jan", t0 + Duration::from_millis(600));

        // The first deadline (t0 + 500ms) no longer applies.
        assert_eq!(d.poll(t0 + Duration::from_millis(700)), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(1099)), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(1100)), Some("Jan"));
    }

    #[test]
    fn cancel_drops_pending() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(FILTER_DEBOUNCE);
        d.schedule(1, t0);
        assert_eq!(d.cancel(), Some(1));
        assert_eq!(d.poll(t0 + Duration::from_secs(1)), None);
    }
}
