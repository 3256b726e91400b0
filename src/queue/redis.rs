//! Redis list backend: producers `LPUSH`, consumers `BRPOP`.

use super::{QueueError, TaskQueue};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

/// Task queue stored in a Redis list.
///
/// Each message is handed to exactly one consumer. There is no acknowledgement: a message
/// popped by a worker that dies before finishing it is lost.
#[derive(Clone)]
pub struct RedisQueue {
    connection: MultiplexedConnection,
    queue_name: String,
}

impl RedisQueue {
    /// Open a multiplexed connection to `url` for the list `queue_name`.
    pub async fn connect(url: &str, queue_name: impl Into<String>) -> Result<Self, QueueError> {
        let client = redis::Client::open(url)
            .map_err(|err| QueueError::Connection(format!("invalid Redis URL: {err}")))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| QueueError::Connection(err.to_string()))?;
        let queue_name = queue_name.into();
        tracing::info!(queue = %queue_name, "Connected to Redis");
        Ok(Self {
            connection,
            queue_name,
        })
    }
}

#[async_trait]
impl TaskQueue for RedisQueue {
    async fn pop(&self) -> Result<Vec<u8>, QueueError> {
        let mut conn = self.connection.clone();
        loop {
            // Timeout 0 blocks until a message arrives; a nil reply only means "try again".
            let reply: Option<(String, Vec<u8>)> = redis::cmd("BRPOP")
                .arg(&self.queue_name)
                .arg(0)
                .query_async(&mut conn)
                .await?;
            if let Some((_, body)) = reply {
                return Ok(body);
            }
        }
    }

    async fn push(&self, body: &[u8]) -> Result<(), QueueError> {
        let mut conn = self.connection.clone();
        let length: i64 = redis::cmd("LPUSH")
            .arg(&self.queue_name)
            .arg(body)
            .query_async(&mut conn)
            .await?;
        tracing::debug!(queue = %self.queue_name, length, "Message pushed");
        Ok(())
    }
}
