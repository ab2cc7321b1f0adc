//! One-shot timers with cancellation support
//!
//! Timers and tracked tasks are spawned on the ambient tokio runtime. Both
//! helpers degrade gracefully when called outside a runtime: they log and
//! report that nothing was scheduled instead of panicking.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::warn;

/// A timer handle that can be used to cancel a pending timer.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    fn new() -> Self {
        Self { token: CancellationToken::new() }
    }

    /// Cancel the timer. The callback will not run if it has not started yet.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if the timer has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Run `callback` once after `delay` unless the returned handle is cancelled
/// first.
///
/// Returns `None` when there is no tokio runtime to schedule on.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use chatcal_common::time::timer::after;
///
/// #[tokio::main]
/// async fn main() {
///     let handle = after(Duration::from_secs(5), || println!("fired"));
///     if let Some(handle) = handle {
///         handle.cancel();
///     }
/// }
/// ```
pub fn after<F>(delay: Duration, callback: F) -> Option<TimerHandle>
where
    F: FnOnce() + Send + 'static,
{
    let runtime = match Handle::try_current() {
        Ok(runtime) => runtime,
        Err(err) => {
            warn!(error = %err, delay_ms = delay.as_millis() as u64, "No tokio runtime; timer not armed");
            return None;
        }
    };

    let handle = TimerHandle::new();
    let token = handle.token.clone();

    runtime.spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = sleep(delay) => {
                if !token.is_cancelled() {
                    callback();
                }
            }
        }
    });

    Some(handle)
}

/// Spawn `future` on the ambient runtime as a member of `tasks`, so a later
/// `tasks.wait()` covers it.
///
/// Returns `false` (and logs) when there is no runtime.
pub fn spawn_tracked<F>(tasks: &TaskTracker, future: F) -> bool
where
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(runtime) => {
            tasks.spawn_on(future, &runtime);
            true
        }
        Err(err) => {
            warn!(error = %err, "No tokio runtime; task dropped");
            false
        }
    }
}
