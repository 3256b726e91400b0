//! Worker loop: dequeue, decode, process, repeat.

use super::{QueueError, TaskQueue};
use crate::metrics::WorkerMetrics;
use crate::processing::{Task, TaskProcessor};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Where the consumer is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    /// Blocked on the queue.
    Waiting,
    /// Handling a dequeued message.
    Processing,
}

/// What happened to one dequeued message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// The task was processed.
    Completed,
    /// The task decoded but processing failed.
    Failed,
    /// The message could not be decoded and was dropped.
    Rejected,
}

/// Pops tasks one at a time and hands them to a [`TaskProcessor`].
///
/// A bad message or a failed task never stops the loop. Only cancellation or a queue
/// transport error does.
pub struct QueueConsumer<Q, P> {
    queue: Q,
    processor: P,
    metrics: Arc<WorkerMetrics>,
    state: ConsumerState,
}

impl<Q, P> QueueConsumer<Q, P>
where
    Q: TaskQueue,
    P: TaskProcessor,
{
    /// Build a consumer in the `Waiting` state.
    pub fn new(queue: Q, processor: P) -> Self {
        Self {
            queue,
            processor,
            metrics: Arc::new(WorkerMetrics::new()),
            state: ConsumerState::Waiting,
        }
    }

    /// Shared handle to the consumer's counters.
    pub fn metrics(&self) -> Arc<WorkerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Current loop state.
    pub fn state(&self) -> ConsumerState {
        self.state
    }

    /// Consume until `cancel` fires or the queue fails.
    ///
    /// Cancellation is only observed while waiting, so an in-flight task always finishes.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), QueueError> {
        tracing::info!("Worker listening for tasks");
        let result = loop {
            self.state = ConsumerState::Waiting;
            let raw = tokio::select! {
                biased;
                _ = cancel.cancelled() => break Ok(()),
                popped = self.queue.pop() => match popped {
                    Ok(raw) => raw,
                    Err(error) => break Err(error),
                },
            };
            self.handle_message(&raw).await;
        };
        self.state = ConsumerState::Waiting;

        let snapshot = self.metrics.snapshot();
        match &result {
            Ok(()) => tracing::info!(
                received = snapshot.messages_received,
                completed = snapshot.tasks_completed,
                failed = snapshot.tasks_failed,
                rejected = snapshot.messages_rejected,
                "Consumer stopped"
            ),
            Err(error) => tracing::error!(
                error = %error,
                received = snapshot.messages_received,
                completed = snapshot.tasks_completed,
                failed = snapshot.tasks_failed,
                rejected = snapshot.messages_rejected,
                "Queue unavailable; consumer stopped"
            ),
        }
        result
    }

    /// Decode and process one raw message, returning to `Waiting` afterwards.
    pub async fn handle_message(&mut self, raw: &[u8]) -> MessageOutcome {
        self.state = ConsumerState::Processing;
        let outcome = self.process_message(raw).await;
        self.state = ConsumerState::Waiting;
        outcome
    }

    async fn process_message(&mut self, raw: &[u8]) -> MessageOutcome {
        self.metrics.record_received();

        let task = match Task::from_slice(raw) {
            Ok(task) => task,
            Err(error) => {
                self.metrics.record_rejected();
                tracing::error!(
                    error = %error,
                    message = %String::from_utf8_lossy(raw),
                    "Dropping undecodable message"
                );
                return MessageOutcome::Rejected;
            }
        };

        let user_id = task.user_id.clone();
        let document_id = task.document_id.clone();
        tracing::info!(%user_id, %document_id, "Received task");
        match self.processor.process(task).await {
            Ok(()) => {
                self.metrics.record_completed();
                tracing::info!(%user_id, %document_id, "Task completed");
                MessageOutcome::Completed
            }
            Err(error) => {
                self.metrics.record_failed();
                tracing::error!(%user_id, %document_id, error = %error, "System error while processing task");
                MessageOutcome::Failed
            }
        }
    }
}
