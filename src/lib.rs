#![deny(missing_docs)]

//! Core library for the wisdom ingestion worker, library ingester, and gateway.

/// HTTP gateway in front of the task queue.
pub mod api;
/// Library catalog: filenames and their descriptive metadata.
pub mod catalog;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion and worker counters.
pub mod metrics;
/// Document processing pipeline utilities.
pub mod processing;
/// Qdrant vector store integration.
pub mod qdrant;
/// Task queue backends and the consuming worker.
pub mod queue;
