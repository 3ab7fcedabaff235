//! Trailing-edge debounce driven by the frame tick.
//!
//! Time is passed in rather than read so the tick loop and tests share one
//! clock.

use std::time::{Duration, Instant};

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// Holds at most one pending value. Scheduling replaces it and restarts the
/// quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet_period: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
        }
    }

    #[must_use]
    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some(Pending {
            value,
            deadline: now + self.quiet_period,
        });
    }

    /// Drop the pending value, if any.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Release the pending value once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| now >= p.deadline) {
            return self.cancel();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_once_after_quiet_period_with_last_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(500));

        // Typing "port" at 100ms intervals.
        for (i, text) in ["p", "po", "por", "port"].into_iter().enumerate() {
            let now = start + ms(100 * i as u64);
            debouncer.schedule(text.to_string(), now);
            assert_eq!(debouncer.poll(now), None);
        }

        // Last keystroke at 300ms; nothing before 800ms.
        assert_eq!(debouncer.poll(start + ms(799)), None);
        assert_eq!(debouncer.poll(start + ms(800)).as_deref(), Some("port"));
        assert_eq!(debouncer.poll(start + ms(2000)), None);
    }

    #[test]
    fn rapid_keystrokes_never_fire_early() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(500));
        let mut fired = 0;
        for i in 0..50u64 {
            let now = start + ms(i * 400);
            if debouncer.poll(now).is_some() {
                fired += 1;
            }
            debouncer.schedule(i, now);
        }
        assert_eq!(fired, 0);
        assert_eq!(debouncer.poll(start + ms(49 * 400 + 500)), Some(49));
    }

    #[test]
    fn cancel_clears_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(500));
        debouncer.schedule("x", start);
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.cancel(), Some("x"));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + ms(1000)), None);
    }

    #[test]
    fn deadline_tracks_latest_schedule() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.schedule(1, start);
        debouncer.schedule(2, start + ms(200));
        assert_eq!(debouncer.deadline(), Some(start + ms(700)));
        assert_eq!(debouncer.quiet_period(), DEFAULT_QUIET_PERIOD);
    }
}
