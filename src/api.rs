//! HTTP gateway in front of the ingestion queue.
//!
//! - `POST /ingest` – Validate a `{user_id, document_id, content}` JSON body and push it,
//!   unchanged, onto the queue. Answers `202 Accepted` with the document id; processing
//!   happens later in a worker.
//! - `GET /health` – Liveness probe.

use crate::processing::Task;
use crate::queue::{QueueError, TaskQueue};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the gateway surface.
pub fn create_router<Q>(queue: Arc<Q>) -> Router
where
    Q: TaskQueue + 'static,
{
    Router::new()
        .route("/ingest", post(ingest::<Q>))
        .route("/health", get(health))
        .with_state(queue)
}

/// Body of a `202 Accepted` answer.
#[derive(Serialize)]
struct AcceptedResponse {
    status: &'static str,
    message: &'static str,
    data: String,
}

/// Queue a submission for asynchronous processing.
///
/// The body is only decoded to check its shape; the raw bytes are what reach the queue.
async fn ingest<Q>(
    State(queue): State<Arc<Q>>,
    body: Bytes,
) -> Result<(StatusCode, Json<AcceptedResponse>), GatewayError>
where
    Q: TaskQueue,
{
    let task = Task::from_slice(&body).map_err(|error| {
        tracing::warn!(error = %error, "Rejecting ingest request");
        GatewayError::InvalidJson
    })?;
    queue.push(&body).await?;
    tracing::info!(
        user_id = %task.user_id,
        document_id = %task.document_id,
        has_content = task.submitted_content().is_some(),
        "Document queued"
    );
    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse {
            status: "accepted",
            message: "Document queued for processing",
            data: task.document_id,
        }),
    ))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

enum GatewayError {
    InvalidJson,
    Queue(QueueError),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidJson => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid JSON" }))).into_response()
            }
            Self::Queue(error) => {
                tracing::error!(error = %error, "Queue push failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Queue push failed" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<QueueError> for GatewayError {
    fn from(inner: QueueError) -> Self {
        Self::Queue(inner)
    }
}
