//! Millisecond clocks used to phase the blinking indicator.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;

// Shared by every monotonic clock so all items blink in phase.
static ORIGIN: Lazy<Instant> = Lazy::new(Instant::now);

/// A monotonic, millisecond-resolution time source.
///
/// Readings must never decrease. Wall-clock time is not suitable.
pub trait Clock {
    /// Current reading in milliseconds.
    fn now_millis(&self) -> i64;
}

/// Milliseconds elapsed since the process first read a monotonic clock.
///
/// Every instance reads the same origin, like an uptime counter, so two clocks
/// created at different moments report the same time.
///
/// ```rust
/// use bubbletea_timer_item::clock::{Clock, MonotonicClock};
///
/// let first = MonotonicClock::new();
/// std::thread::sleep(std::time::Duration::from_millis(20));
/// let second = MonotonicClock::new();
/// assert!(second.now_millis() >= 20);
/// assert!(second.now_millis() - first.now_millis() <= 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock on the process-wide origin.
    pub fn new() -> Self {
        Self { origin: *ORIGIN }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> i64 {
        i64::try_from(self.origin.elapsed().as_millis()).unwrap_or(i64::MAX)
    }
}

/// A clock moved by hand.
///
/// Clones share the same reading, so a host (or a test) can keep one handle and
/// give another to a widget.
///
/// ```rust
/// use bubbletea_timer_item::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_000);
/// let shared = clock.clone();
/// clock.advance(250);
/// assert_eq!(shared.now_millis(), 1_250);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a clock reading `start_millis`.
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_millis)),
        }
    }

    /// Sets the reading. The caller keeps it monotonic.
    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    /// Moves the reading forward by `millis`.
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_never_decreases() {
        let clock = MonotonicClock::new();
        let first = clock.now_millis();
        let second = clock.now_millis();
        assert!(first >= 0);
        assert!(second >= first);
    }

    #[test]
    fn test_monotonic_clocks_share_origin() {
        let early = MonotonicClock::new();
        std::thread::sleep(std::time::Duration::from_millis(30));
        let late = MonotonicClock::new();

        let late_reading = late.now_millis();
        let early_reading = early.now_millis();
        assert!(late_reading >= 30);
        assert!(early_reading >= late_reading);
        assert!(early_reading - late_reading <= 1);
    }

    #[test]
    fn test_manual_clock_set_and_advance() {
        let clock = ManualClock::new(0);
        assert_eq!(clock.now_millis(), 0);
        clock.set(1_200);
        assert_eq!(clock.now_millis(), 1_200);
        clock.advance(300);
        assert_eq!(clock.now_millis(), 1_500);
    }

    #[test]
    fn test_manual_clock_clones_share_reading() {
        let clock = ManualClock::default();
        let handle = clock.clone();
        handle.advance(42);
        assert_eq!(clock.now_millis(), 42);
    }
}
