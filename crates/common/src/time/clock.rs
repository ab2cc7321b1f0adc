//! Time abstraction for testability
//!
//! Conversation bookkeeping works in integer milliseconds since the UNIX
//! epoch. Components take an `Arc<dyn Clock>` so tests can drive time
//! explicitly instead of sleeping.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use chatcal_common::time::{Clock, MockClock, SystemClock};
//!
//! // Use system clock in production
//! let clock = SystemClock;
//! assert!(clock.now_millis() > 0);
//!
//! // Use mock clock in tests
//! let mock = MockClock::at(0);
//! mock.advance(Duration::from_secs(5));
//! assert_eq!(mock.now_millis(), 5_000);
//! ```

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of "now" in milliseconds since the UNIX epoch.
pub trait Clock: Send + Sync {
    /// Current wall-clock time in epoch milliseconds.
    fn now_millis(&self) -> i64;
}

/// Real system clock implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or_default()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

/// Mock clock for deterministic testing.
///
/// Clones share the same underlying instant, so a test can hand one copy to
/// the component under test and keep another to advance time.
///
/// ```
/// use std::time::Duration;
///
/// use chatcal_common::time::{Clock, MockClock};
///
/// let clock = MockClock::at(10_000);
/// let handle = clock.clone();
/// handle.advance(Duration::from_millis(250));
/// assert_eq!(clock.now_millis(), 10_250);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    millis: Arc<AtomicI64>,
}

impl MockClock {
    /// Create a mock clock frozen at the given epoch milliseconds.
    #[must_use]
    pub fn at(millis: i64) -> Self {
        Self { millis: Arc::new(AtomicI64::new(millis)) }
    }

    /// Advance the mock clock by a duration.
    pub fn advance(&self, duration: Duration) {
        let delta = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }

    /// Jump to an absolute instant.
    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}
