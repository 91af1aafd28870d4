use std::{cell::Cell, rc::Rc, time::Duration, time::Instant};

/// Monotonic time source driving playback. Readings are offsets from an arbitrary origin.
pub trait Clock {
    /// Current reading.
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Start counting from now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for deterministic hosts and tests.
///
/// Clones share one reading, so a test can keep a handle while the player owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Rc<Cell<Duration>>);

impl ManualClock {
    /// Clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to `t`. Going backwards is ignored.
    pub fn set(&self, t: Duration) {
        if t > self.0.get() {
            self.0.set(t);
        }
    }

    /// Move forward by `dt`.
    pub fn advance(&self, dt: Duration) {
        self.0.set(self.0.get() + dt);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_shared_and_monotonic() {
        let a = ManualClock::new();
        let b = a.clone();
        a.advance(Duration::from_millis(250));
        assert_eq!(b.now(), Duration::from_millis(250));
        b.set(Duration::from_millis(100));
        assert_eq!(a.now(), Duration::from_millis(250));
        b.set(Duration::from_secs(2));
        assert_eq!(a.now(), Duration::from_secs(2));
    }

    #[test]
    fn monotonic_clock_never_goes_back() {
        let c = MonotonicClock::new();
        let t0 = c.now();
        assert!(c.now() >= t0);
    }
}
