//! Time utilities and abstractions
//!
//! - **[`clock`]**: Wall-clock abstraction with a controllable mock for tests
//! - **[`timer`]**: Cancellable one-shot timers and tracked task spawning
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use chatcal_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::at(1_000);
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.now_millis(), 6_000);
//! ```

pub mod clock;
pub mod timer;

// Re-export commonly used items
pub use clock::{Clock, MockClock, SystemClock};
pub use timer::{after, spawn_tracked, TimerHandle};
