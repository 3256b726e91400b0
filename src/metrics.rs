use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing library ingestion activity.
#[derive(Default)]
pub struct IngestionMetrics {
    documents_indexed: AtomicU64,
    documents_skipped: AtomicU64,
    documents_failed: AtomicU64,
    chunks_indexed: AtomicU64,
    batches_upserted: AtomicU64,
}

impl IngestionMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a batch that reached the vector index.
    pub fn record_batch(&self, chunk_count: u64) {
        self.batches_upserted.fetch_add(1, Ordering::Relaxed);
        self.chunks_indexed
            .fetch_add(chunk_count, Ordering::Relaxed);
    }

    /// Record a document whose batches were all upserted.
    pub fn record_indexed(&self) {
        self.documents_indexed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a document that was not attempted.
    pub fn record_skipped(&self) {
        self.documents_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a document that stopped part-way.
    pub fn record_failed(&self) {
        self.documents_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> IngestionSnapshot {
        IngestionSnapshot {
            documents_indexed: self.documents_indexed.load(Ordering::Relaxed),
            documents_skipped: self.documents_skipped.load(Ordering::Relaxed),
            documents_failed: self.documents_failed.load(Ordering::Relaxed),
            chunks_indexed: self.chunks_indexed.load(Ordering::Relaxed),
            batches_upserted: self.batches_upserted.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of ingestion counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct IngestionSnapshot {
    /// Documents fully indexed since startup.
    pub documents_indexed: u64,
    /// Documents skipped because their file was missing.
    pub documents_skipped: u64,
    /// Documents that failed part-way.
    pub documents_failed: u64,
    /// Points written across all documents.
    pub chunks_indexed: u64,
    /// Upsert calls that succeeded.
    pub batches_upserted: u64,
}

/// Counters maintained by the queue consumer.
#[derive(Default)]
pub struct WorkerMetrics {
    messages_received: AtomicU64,
    messages_rejected: AtomicU64,
    tasks_completed: AtomicU64,
    tasks_failed: AtomicU64,
}

impl WorkerMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message taken off the queue.
    pub fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a message dropped because it could not be decoded.
    pub fn record_rejected(&self) {
        self.messages_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a task that completed.
    pub fn record_completed(&self) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a task whose processing failed.
    pub fn record_failed(&self) {
        self.tasks_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> WorkerSnapshot {
        WorkerSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_rejected: self.messages_rejected.load(Ordering::Relaxed),
            tasks_completed: self.tasks_completed.load(Ordering::Relaxed),
            tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of consumer counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct WorkerSnapshot {
    /// Messages popped from the queue.
    pub messages_received: u64,
    /// Messages dropped as undecodable.
    pub messages_rejected: u64,
    /// Tasks processed successfully.
    pub tasks_completed: u64,
    /// Tasks whose processing failed.
    pub tasks_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_documents_and_batches() {
        let metrics = IngestionMetrics::new();
        metrics.record_batch(50);
        metrics.record_batch(7);
        metrics.record_indexed();
        metrics.record_skipped();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches_upserted, 2);
        assert_eq!(snapshot.chunks_indexed, 57);
        assert_eq!(snapshot.documents_indexed, 1);
        assert_eq!(snapshot.documents_skipped, 1);
        assert_eq!(snapshot.documents_failed, 0);
    }

    #[test]
    fn worker_snapshot_starts_empty() {
        let metrics = WorkerMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.messages_received, 0);
        assert_eq!(snapshot.tasks_completed, 0);
        metrics.record_received();
        metrics.record_rejected();
        assert_eq!(metrics.snapshot().messages_rejected, 1);
    }
}
