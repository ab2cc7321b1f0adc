//! Modular common utilities shared across ChatCal crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: collections
//! - `runtime`: clock abstraction and tokio-backed one-shot timers
//! - `observability`: tracing output from runtime helpers

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod collections;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod time;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use collections::RingBuffer;
#[cfg(feature = "runtime")]
pub use time::{Clock, MockClock, SystemClock, TimerHandle};
