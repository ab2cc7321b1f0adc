//! Application context - dependency wiring

use std::sync::Arc;
use std::time::Duration;

use chatcal_core::{BatchAnalyzer, BatchObserver, ConversationTracker};
use chatcal_domain::{AnalyzerConfig, ChatCalError, Config, Result};
use chatcal_infra::{
    CleanupScheduler, LoggingBatchAnalyzer, MetricsSnapshot, TriageMetrics, WebhookBatchAnalyzer,
};
use tracing::{info, warn};

const START_TIMEOUT_SECS: u64 = 10;
const DRAIN_TIMEOUT_SECS: u64 = 30;

/// Holds the tracker and the background services around it
pub struct AppContext {
    pub config: Config,
    pub tracker: Arc<ConversationTracker>,
    pub metrics: Arc<TriageMetrics>,
    cleanup_scheduler: CleanupScheduler,
}

impl AppContext {
    /// Wire the tracker to its analyzer and start the cleanup scheduler.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn new(config: Config) -> Result<Self> {
        let analyzer = build_analyzer(&config.analyzer)?;
        let metrics = Arc::new(TriageMetrics::new());

        let tracker = Arc::new(
            ConversationTracker::builder(analyzer)
                .with_observer(Arc::clone(&metrics) as Arc<dyn BatchObserver>)
                .with_config(config.triage.clone())
                .build(),
        );

        let mut cleanup_scheduler = CleanupScheduler::new(
            Arc::clone(&tracker),
            Duration::from_secs(config.cleanup.interval_secs.max(1)),
        )
        .with_metrics(Arc::clone(&metrics));

        tokio::time::timeout(Duration::from_secs(START_TIMEOUT_SECS), cleanup_scheduler.start())
            .await
            .map_err(|_| {
                tracing::error!(timeout_secs = START_TIMEOUT_SECS, "CleanupScheduler start timed out");
                ChatCalError::Internal(format!(
                    "CleanupScheduler start timed out after {START_TIMEOUT_SECS}s"
                ))
            })??;

        Ok(Self { config, tracker, metrics, cleanup_scheduler })
    }

    pub fn is_cleanup_running(&self) -> bool {
        self.cleanup_scheduler.is_running()
    }

    /// Stop background work, wait for in-flight analyzer calls and return
    /// the final metrics.
    ///
    /// Batches still pending are discarded; their timers die with the tracker.
    /// Analyzer calls that outlive the drain timeout are neither analyzed nor
    /// dropped in the returned metrics.
    pub async fn shutdown(mut self) -> Result<MetricsSnapshot> {
        self.cleanup_scheduler.stop().await?;

        if !self.tracker.drain_in_flight(Duration::from_secs(DRAIN_TIMEOUT_SECS)).await {
            warn!(
                in_flight = self.tracker.in_flight_batches(),
                timeout_secs = DRAIN_TIMEOUT_SECS,
                "Abandoning batch analysis still running at shutdown"
            );
        }

        let snapshot = self.metrics.snapshot();
        info!(
            conversations = self.tracker.conversation_count(),
            batches_flushed = snapshot.batches_flushed(),
            batches_dropped = snapshot.batches_dropped,
            "ChatCal shut down"
        );
        Ok(snapshot)
    }
}

/// Pick the analyzer for this host: the webhook when enabled, otherwise one
/// that only logs flushed batches.
pub fn build_analyzer(config: &AnalyzerConfig) -> Result<Arc<dyn BatchAnalyzer>> {
    if !config.enabled {
        info!("Analyzer disabled, batches will only be logged");
        return Ok(Arc::new(LoggingBatchAnalyzer));
    }

    match config.webhook_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => {
            let analyzer = WebhookBatchAnalyzer::from_config(config)?;
            info!(webhook_url = %analyzer.webhook_url(), "Using webhook analyzer");
            Ok(Arc::new(analyzer))
        }
        _ => {
            warn!("No analyzer webhook_url configured, batches will only be logged");
            Ok(Arc::new(LoggingBatchAnalyzer))
        }
    }
}
