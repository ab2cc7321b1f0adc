//! Periodic eviction of idle conversations.
//!
//! Runs [`ConversationTracker::cleanup_old_conversations`] on a fixed
//! interval in a background task. Pending batches of evicted conversations
//! are discarded with them; their timers are cancelled by the tracker.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use chatcal_core::ConversationTracker;
//! use chatcal_infra::integrations::LoggingBatchAnalyzer;
//! use chatcal_infra::scheduling::CleanupScheduler;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tracker = Arc::new(ConversationTracker::new(Arc::new(LoggingBatchAnalyzer)));
//! let mut scheduler = CleanupScheduler::new(tracker, Duration::from_secs(300));
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chatcal_core::ConversationTracker;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::observability::TriageMetrics;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

const STOP_TIMEOUT_SECS: u64 = 5;

/// Background task that evicts conversations idle past the eviction window
pub struct CleanupScheduler {
    tracker: Arc<ConversationTracker>,
    interval: Duration,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
    metrics: Option<Arc<TriageMetrics>>,
}

impl CleanupScheduler {
    pub fn new(tracker: Arc<ConversationTracker>, interval: Duration) -> Self {
        Self {
            tracker,
            interval,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
            metrics: None,
        }
    }

    /// Report eviction counts to `metrics` on every sweep.
    pub fn with_metrics(mut self, metrics: Arc<TriageMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Start the scheduler
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        // Fresh token so the scheduler can be restarted after stop
        self.cancellation_token = CancellationToken::new();

        let tracker = Arc::clone(&self.tracker);
        let metrics = self.metrics.clone();
        let interval = self.interval;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::cleanup_loop(tracker, metrics, interval, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!(interval_secs = interval.as_secs(), "Cleanup scheduler started");
        Ok(())
    }

    /// Stop the scheduler and wait for the background task to finish
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is not running or the task does not
    /// finish within the join timeout
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            tokio::time::timeout(Duration::from_secs(STOP_TIMEOUT_SECS), handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: STOP_TIMEOUT_SECS })??;
        }

        info!("Cleanup scheduler stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    async fn cleanup_loop(
        tracker: Arc<ConversationTracker>,
        metrics: Option<Arc<TriageMetrics>>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Cleanup loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    let evicted = tracker.cleanup_old_conversations();
                    if let Some(metrics) = &metrics {
                        metrics.record_evictions(evicted);
                    }
                    debug!(
                        evicted,
                        remaining = tracker.conversation_count(),
                        "Cleanup sweep finished"
                    );
                }
            }
        }
    }
}

impl Drop for CleanupScheduler {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use chatcal_common::MockClock;
    use chatcal_domain::constants::CONVERSATION_EVICTION_MS;

    use super::*;
    use crate::integrations::LoggingBatchAnalyzer;

    const T0: i64 = 1_700_000_000_000;

    fn tracker_with_clock(clock: Arc<MockClock>) -> Arc<ConversationTracker> {
        Arc::new(
            ConversationTracker::builder(Arc::new(LoggingBatchAnalyzer))
                .with_clock(clock)
                .build(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_is_rejected() {
        let tracker = tracker_with_clock(Arc::new(MockClock::at(T0)));
        let mut scheduler = CleanupScheduler::new(tracker, Duration::from_secs(60));

        scheduler.start().await.unwrap();
        assert!(scheduler.is_running());
        assert!(matches!(scheduler.start().await, Err(SchedulerError::AlreadyRunning)));

        scheduler.stop().await.unwrap();
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn stop_without_start_is_rejected() {
        let tracker = tracker_with_clock(Arc::new(MockClock::at(T0)));
        let mut scheduler = CleanupScheduler::new(tracker, Duration::from_secs(60));

        assert!(matches!(scheduler.stop().await, Err(SchedulerError::NotRunning)));
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_evicts_idle_conversations() {
        let clock = Arc::new(MockClock::at(T0));
        let tracker = tracker_with_clock(Arc::clone(&clock));
        let metrics = Arc::new(TriageMetrics::new());

        tracker.add_message(&"idle".into(), "hello there everyone", "ana", None);
        clock.advance(Duration::from_millis(CONVERSATION_EVICTION_MS as u64 + 1));
        tracker.add_message(&"fresh".into(), "still chatting here", "ben", None);

        let mut scheduler = CleanupScheduler::new(Arc::clone(&tracker), Duration::from_secs(60))
            .with_metrics(Arc::clone(&metrics));
        scheduler.start().await.unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;

        assert_eq!(tracker.conversation_count(), 1);
        assert!(tracker.conversation(&"fresh".into()).is_some());
        assert_eq!(metrics.snapshot().conversations_evicted, 1);

        scheduler.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn restarts_after_stop() {
        let tracker = tracker_with_clock(Arc::new(MockClock::at(T0)));
        let mut scheduler = CleanupScheduler::new(tracker, Duration::from_secs(60));

        scheduler.start().await.unwrap();
        scheduler.stop().await.unwrap();
        scheduler.start().await.unwrap();
        assert!(scheduler.is_running());
        scheduler.stop().await.unwrap();
    }
}
