use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// HTTP layer failed before a usable response arrived.
    #[error("Embedding request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider answered with a non-success status.
    #[error("Unexpected embedding response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the provider.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Interface implemented by embedding backends.
///
/// Implementations must return exactly one vector per input text, in input order.
#[async_trait]
pub trait EmbeddingClient {
    /// Produce an embedding vector for each supplied chunk of text.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

/// Embedding client for OpenAI-compatible `/embeddings` endpoints.
pub struct OpenAiEmbeddingClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbeddingClient {
    /// Construct a client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, EmbeddingClientError> {
        Self::with_endpoint(
            &config.openai_base_url,
            &config.openai_api_key,
            &config.embedding_model,
            config.embedding_dimension,
        )
    }

    /// Construct a client against an explicit API root.
    pub fn with_endpoint(
        base_url: &str,
        api_key: &str,
        model: &str,
        dimensions: usize,
    ) -> Result<Self, EmbeddingClientError> {
        if api_key.trim().is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "missing embedding API key".to_string(),
            ));
        }
        let client = Client::builder().user_agent("wisdom-ingest/0.1").build()?;
        let endpoint = format!("{}/embeddings", base_url.trim_end_matches('/'));
        tracing::debug!(endpoint = %endpoint, model, dimensions, "Initialized embedding client");
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            dimensions,
        })
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "no texts provided".to_string(),
            ));
        }

        tracing::debug!(model = %self.model, inputs = texts.len(), "Generating embeddings");
        let request = EmbeddingRequest {
            model: &self.model,
            input: &texts,
            dimensions: self.dimensions,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = EmbeddingClientError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Embedding request failed");
            return Err(error);
        }

        let mut parsed: EmbeddingResponse = response.json().await?;
        // The API may answer out of order; `index` is the position in `input`.
        parsed.data.sort_by_key(|entry| entry.index);
        Ok(parsed
            .data
            .into_iter()
            .map(|entry| entry.embedding)
            .collect())
    }
}
