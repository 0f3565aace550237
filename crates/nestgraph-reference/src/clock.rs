use crate::lockfree::AtomicDouble;

/// Monotonic clock that only moves when told to.
///
/// Stands in for a real-time audio clock: tests and tools advance it
/// explicitly, then read parameter values at the new time.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicDouble,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(seconds: f64) -> Self {
        Self {
            now: AtomicDouble::new(seconds.max(0.0)),
        }
    }

    /// Current time in seconds.
    pub fn now(&self) -> f64 {
        self.now.get()
    }

    /// Move to `seconds`. Ignored if it would go backwards.
    pub fn set(&self, seconds: f64) {
        if seconds.is_finite() && seconds >= self.now() {
            self.now.set(seconds);
        }
    }

    /// Move forward by `seconds` and return the new time.
    pub fn advance(&self, seconds: f64) -> f64 {
        if seconds.is_finite() && seconds > 0.0 {
            self.now.add(seconds)
        } else {
            self.now()
        }
    }
}
