//! Task queue abstraction, its Redis backend, and the consuming worker loop.

pub mod consumer;
pub mod redis;

use async_trait::async_trait;
use thiserror::Error;

pub use consumer::{ConsumerState, MessageOutcome, QueueConsumer};
pub use self::redis::RedisQueue;

/// Errors raised by queue backends.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The backend could not be reached.
    #[error("Queue connection failed: {0}")]
    Connection(String),
    /// A Redis command failed.
    #[error("Redis command failed: {0}")]
    Redis(#[from] ::redis::RedisError),
}

/// FIFO of raw task messages.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Wait, without timeout, for the oldest message and remove it.
    async fn pop(&self) -> Result<Vec<u8>, QueueError>;

    /// Append a message to the queue.
    async fn push(&self, body: &[u8]) -> Result<(), QueueError>;
}
