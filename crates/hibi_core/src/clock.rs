//! Time source injected into the store and controller.

use chrono::{DateTime, TimeZone, Utc};
use std::cell::Cell;

/// Represents the entity responsible for providing "now" across the crate, so
/// tests can pin time instead of reading the wall clock.
pub trait Clock {
    /// Current time as Unix epoch milliseconds.
    fn now_ms(&self) -> i64;

    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.now_ms())
            .single()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock. Starts at a fixed instant and only moves on
/// `set` or `advance`.
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    now_ms: Cell<i64>,
}

impl FixedClock {
    pub fn at(now_ms: i64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

impl<T: Clock + ?Sized> Clock for std::rc::Rc<T> {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock};

    #[test]
    fn fixed_clock_moves_only_when_told() {
        let clock = FixedClock::at(1_700_000_000_000);
        assert_eq!(clock.now_ms(), 1_700_000_000_000);

        clock.advance(1_500);
        assert_eq!(clock.now_ms(), 1_700_000_001_500);
        assert_eq!(clock.now().timestamp_millis(), 1_700_000_001_500);

        clock.set(0);
        assert_eq!(clock.now_ms(), 0);
    }
}
