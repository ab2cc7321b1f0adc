//! Debounced per-conversation batching
//!
//! Every message lands in its conversation's pending buffer and restarts a
//! quiet-period timer. A buffer leaves for analysis when:
//!
//! - the timer expires with no newer message ([`FlushReason::Timer`]),
//! - it reaches `max_batch_size` ([`FlushReason::BatchFull`]),
//! - the newest message matches a high-priority pattern
//!   ([`FlushReason::Priority`]).
//!
//! Enqueueing is synchronous. The analyzer call is spawned on the ambient
//! tokio runtime and never awaited by the caller; [`BatchScheduler::drain`]
//! waits for the calls still in flight at shutdown.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chatcal_common::time::{after, spawn_tracked, Clock, SystemClock, TimerHandle};
use chatcal_domain::{ChatCalError, ConversationId, FlushReason, InboundMessage, TriageConfig};
use parking_lot::Mutex;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use super::ports::{BatchAnalyzer, BatchObserver, ConversationContext, NoopBatchObserver};
use crate::triage::patterns::is_high_priority;

/// Pending messages and debounce timer for one conversation.
#[derive(Debug, Default)]
struct BatchBuffer {
    pending: Vec<InboundMessage>,
    timer: Option<TimerHandle>,
    /// Bumped on every cancellation; a timer only flushes if its generation
    /// is still current when it fires.
    timer_generation: u64,
    last_flushed_at: Option<i64>,
}

impl BatchBuffer {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        self.timer_generation = self.timer_generation.wrapping_add(1);
    }

    fn take_pending(&mut self, now: i64) -> Vec<InboundMessage> {
        self.last_flushed_at = Some(now);
        std::mem::take(&mut self.pending)
    }
}

/// What happened to an enqueued message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The buffer was flushed, this message included.
    Flushed(FlushReason),
    /// The message is waiting for the debounce timer.
    Pending,
}

/// Per-conversation debounced batch buffers.
///
/// Cloning is cheap and shares the same buffers; armed timers hold a clone
/// until they fire or are cancelled.
#[derive(Clone)]
pub struct BatchScheduler {
    buffers: Arc<Mutex<HashMap<ConversationId, BatchBuffer>>>,
    analyzer: Arc<dyn BatchAnalyzer>,
    observer: Arc<dyn BatchObserver>,
    context: Arc<dyn ConversationContext>,
    clock: Arc<dyn Clock>,
    in_flight: TaskTracker,
    batch_timeout: Duration,
    max_batch_size: usize,
}

impl BatchScheduler {
    /// Create a scheduler using the timing values of `config`.
    pub fn new(
        analyzer: Arc<dyn BatchAnalyzer>,
        context: Arc<dyn ConversationContext>,
        config: &TriageConfig,
    ) -> Self {
        Self {
            buffers: Arc::new(Mutex::new(HashMap::new())),
            analyzer,
            observer: Arc::new(NoopBatchObserver),
            context,
            clock: Arc::new(SystemClock),
            in_flight: TaskTracker::new(),
            batch_timeout: config.batch_timeout(),
            max_batch_size: config.max_batch_size,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn BatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Clock used for `last_flushed_at`. Debounce timing always follows the
    /// tokio timer.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Append a message to its conversation's buffer and either flush or
    /// restart the debounce timer.
    pub fn add_message(
        &self,
        conversation_id: &ConversationId,
        message: InboundMessage,
    ) -> EnqueueOutcome {
        let priority = is_high_priority(&message.text);
        let now = self.clock.now_millis();

        let flushed = {
            let mut buffers = self.buffers.lock();
            let buffer = buffers.entry(conversation_id.clone()).or_default();
            buffer.pending.push(message);
            buffer.cancel_timer();

            let reason = if buffer.pending.len() >= self.max_batch_size {
                Some(FlushReason::BatchFull)
            } else if priority {
                Some(FlushReason::Priority)
            } else {
                None
            };

            match reason {
                Some(reason) => Some((buffer.take_pending(now), reason)),
                None => {
                    buffer.timer = self.arm_timer(conversation_id, buffer.timer_generation);
                    debug!(
                        conversation_id = %conversation_id,
                        pending = buffer.pending.len(),
                        "Debounce timer restarted"
                    );
                    None
                }
            }
        };

        match flushed {
            Some((batch, reason)) => {
                self.dispatch(conversation_id, batch, reason);
                EnqueueOutcome::Flushed(reason)
            }
            None => EnqueueOutcome::Pending,
        }
    }

    /// Drop a conversation's buffer and cancel its timer. Pending messages
    /// are discarded. Returns whether a buffer existed.
    pub fn evict(&self, conversation_id: &ConversationId) -> bool {
        let removed = self.buffers.lock().remove(conversation_id);
        match removed {
            Some(mut buffer) => {
                buffer.cancel_timer();
                if !buffer.pending.is_empty() {
                    debug!(
                        conversation_id = %conversation_id,
                        discarded = buffer.pending.len(),
                        "Evicted buffer with pending messages"
                    );
                }
                true
            }
            None => false,
        }
    }

    pub fn pending_len(&self, conversation_id: &ConversationId) -> usize {
        self.buffers.lock().get(conversation_id).map_or(0, |buffer| buffer.pending.len())
    }

    pub fn last_flushed_at(&self, conversation_id: &ConversationId) -> Option<i64> {
        self.buffers.lock().get(conversation_id).and_then(|buffer| buffer.last_flushed_at)
    }

    pub fn has_armed_timer(&self, conversation_id: &ConversationId) -> bool {
        self.buffers.lock().get(conversation_id).is_some_and(|buffer| buffer.timer.is_some())
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.lock().len()
    }

    /// Analyzer calls dispatched but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Wait up to `timeout` for in-flight analyzer calls to finish. Returns
    /// `false` if some were still running when the timeout elapsed.
    ///
    /// Pending buffers are left alone; only batches already handed to the
    /// analyzer are waited for.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.in_flight.close();
        let drained = tokio::time::timeout(timeout, self.in_flight.wait()).await.is_ok();
        self.in_flight.reopen();

        if drained {
            debug!("In-flight batch analysis drained");
        } else {
            warn!(
                in_flight = self.in_flight.len(),
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                "Batch analysis still running after drain timeout"
            );
        }
        drained
    }

    fn arm_timer(&self, conversation_id: &ConversationId, generation: u64) -> Option<TimerHandle> {
        let scheduler = self.clone();
        let conversation_id = conversation_id.clone();
        after(self.batch_timeout, move || scheduler.on_timer(&conversation_id, generation))
    }

    fn on_timer(&self, conversation_id: &ConversationId, generation: u64) {
        let batch = {
            let mut buffers = self.buffers.lock();
            let Some(buffer) = buffers.get_mut(conversation_id) else {
                return;
            };
            if buffer.timer_generation != generation {
                debug!(conversation_id = %conversation_id, "Superseded debounce timer ignored");
                return;
            }
            buffer.timer = None;
            if buffer.pending.is_empty() {
                return;
            }
            buffer.take_pending(self.clock.now_millis())
        };

        self.dispatch(conversation_id, batch, FlushReason::Timer);
    }

    /// Hand a taken batch to the analyzer together with the conversation's
    /// current context window. Must be called without the buffer lock held.
    fn dispatch(&self, conversation_id: &ConversationId, batch: Vec<InboundMessage>, reason: FlushReason) {
        let size = batch.len();
        let context = self.context.recent_messages(conversation_id);

        info!(
            conversation_id = %conversation_id,
            batch_size = size,
            context_size = context.len(),
            reason = %reason,
            "Flushing conversation batch"
        );
        self.observer.on_batch_flushed(conversation_id, size, reason);

        let analyzer = Arc::clone(&self.analyzer);
        let observer = Arc::clone(&self.observer);
        let id = conversation_id.clone();

        let spawned = spawn_tracked(&self.in_flight, async move {
            match analyzer.analyze_conversation_batch(&id, &batch, &context).await {
                Ok(()) => {
                    debug!(conversation_id = %id, batch_size = size, "Batch analyzed");
                    observer.on_batch_analyzed(&id, size);
                }
                Err(err) => {
                    error!(
                        conversation_id = %id,
                        batch_size = size,
                        error = %err,
                        "Batch analysis failed; batch dropped"
                    );
                    observer.on_batch_dropped(&id, size, &err);
                }
            }
        });

        if !spawned {
            let err = ChatCalError::Internal("no async runtime available for batch analysis".into());
            error!(
                conversation_id = %conversation_id,
                batch_size = size,
                error = %err,
                "Batch dropped"
            );
            self.observer.on_batch_dropped(conversation_id, size, &err);
        }
    }
}

impl std::fmt::Debug for BatchScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScheduler")
            .field("batch_timeout", &self.batch_timeout)
            .field("max_batch_size", &self.max_batch_size)
            .field("buffers", &self.buffer_count())
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}
