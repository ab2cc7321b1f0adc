//! Batch dispatch types

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Why a pending batch left the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushReason {
    /// Pending reached the configured maximum batch size.
    BatchFull,
    /// The newest message matched a high-priority pattern.
    Priority,
    /// The debounce timer expired without newer messages.
    Timer,
}

impl_domain_status_conversions!(FlushReason {
    BatchFull => "batch_full",
    Priority => "priority",
    Timer => "timer",
});
