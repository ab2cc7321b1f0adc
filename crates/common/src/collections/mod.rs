//! Specialized data structures
//!
//! - **[`ring_buffer`]**: Fixed-size FIFO window that evicts the oldest entry
//!
//! ## Usage
//!
//! ```rust
//! use chatcal_common::collections::RingBuffer;
//!
//! let mut window = RingBuffer::new(2);
//! window.push("a");
//! window.push("b");
//! assert_eq!(window.push("c"), Some("a"));
//! ```

pub mod ring_buffer;

// Re-export commonly used types
pub use ring_buffer::RingBuffer;
