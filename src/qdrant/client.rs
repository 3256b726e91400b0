//! HTTP client wrapper for interacting with Qdrant.

use crate::config::Config;
use crate::qdrant::types::{IndexPoint, QdrantError, VectorParams};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::json;

/// Vector-store operations the ingestion pipeline depends on.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Report whether a collection with this name exists.
    async fn collection_exists(&self, collection_name: &str) -> Result<bool, QdrantError>;

    /// Create a collection with the given vector configuration.
    async fn create_collection(
        &self,
        collection_name: &str,
        params: VectorParams,
    ) -> Result<(), QdrantError>;

    /// Insert or overwrite points by id.
    async fn upsert_points(
        &self,
        collection_name: &str,
        points: Vec<IndexPoint>,
    ) -> Result<(), QdrantError>;
}

/// Create the collection only when it is missing.
///
/// Returns `true` when a creation call was issued. The check and the create are not atomic;
/// a single writer per collection is assumed.
pub async fn ensure_collection<I>(
    index: &I,
    collection_name: &str,
    params: VectorParams,
) -> Result<bool, QdrantError>
where
    I: VectorIndex + ?Sized,
{
    if index.collection_exists(collection_name).await? {
        tracing::debug!(collection = collection_name, "Collection already present");
        return Ok(false);
    }

    tracing::warn!(
        collection = collection_name,
        vector_size = params.size,
        distance = params.distance.as_str(),
        "Collection not found; creating"
    );
    index.create_collection(collection_name, params).await?;
    Ok(true)
}

/// Lightweight HTTP client for Qdrant operations.
pub struct QdrantService {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
}

impl QdrantService {
    /// Construct a new client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, QdrantError> {
        Self::with_base_url(&config.qdrant_url, config.qdrant_api_key.clone())
    }

    /// Construct a client against an explicit Qdrant base URL.
    pub fn with_base_url(url: &str, api_key: Option<String>) -> Result<Self, QdrantError> {
        let client = Client::builder().user_agent("wisdom-ingest/0.1").build()?;

        let base_url = normalize_base_url(url).map_err(QdrantError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_api_key = %api_key
                .as_deref()
                .map(|value| !value.is_empty())
                .unwrap_or(false),
            "Initialized Qdrant HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(api_key) = self.api_key.as_deref().filter(|key| !key.is_empty()) {
            req = req.header("api-key", api_key);
        }
        req
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<(), QdrantError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = QdrantError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Qdrant request failed");
            Err(error)
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantService {
    async fn collection_exists(&self, collection_name: &str) -> Result<bool, QdrantError> {
        let response = self
            .request(Method::GET, &format!("collections/{collection_name}"))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = QdrantError::UnexpectedStatus { status, body };
                tracing::error!(collection = collection_name, error = %error, "Collection existence check failed");
                Err(error)
            }
        }
    }

    async fn create_collection(
        &self,
        collection_name: &str,
        params: VectorParams,
    ) -> Result<(), QdrantError> {
        let body = json!({ "vectors": params });

        let response = self
            .request(Method::PUT, &format!("collections/{collection_name}"))
            .json(&body)
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::info!(
                collection = collection_name,
                vector_size = params.size,
                "Collection created"
            );
        })
        .await
    }

    async fn upsert_points(
        &self,
        collection_name: &str,
        points: Vec<IndexPoint>,
    ) -> Result<(), QdrantError> {
        if points.is_empty() {
            return Ok(());
        }

        let point_count = points.len();
        let response = self
            .request(
                Method::PUT,
                &format!("collections/{collection_name}/points"),
            )
            .query(&[("wait", true)])
            .json(&json!({ "points": points }))
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!(
                collection = collection_name,
                points = point_count,
                "Points upserted"
            );
        })
        .await
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
