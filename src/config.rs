use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Default OpenAI-compatible API root used for embedding requests.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Embedding model requested when `EMBEDDING_MODEL` is unset.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
/// Vector dimensionality shared by the embedding model and every collection.
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;
/// Queue consumed by the worker and fed by the gateway.
pub const DEFAULT_QUEUE_NAME: &str = "ingestion_queue";
/// Primary library directory, relative to the working directory.
pub const PRIMARY_LIBRARY_DIR: &str = "../data/books";
/// Fallback library directory, relative to the working directory.
pub const FALLBACK_LIBRARY_DIR: &str = "data/books";

/// Runtime configuration shared by the queue worker and the library ingester.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// API credential for the embedding service.
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible embeddings API.
    pub openai_base_url: String,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Dimensionality of the produced vectors.
    pub embedding_dimension: usize,
    /// Base URL of the Qdrant instance that stores embeddings.
    pub qdrant_url: String,
    /// Optional API key required to access Qdrant.
    pub qdrant_api_key: Option<String>,
    /// Connection URL of the Redis instance backing the task queue.
    pub redis_url: String,
    /// Name of the Redis list used as the task queue.
    pub queue_name: String,
    /// Collection holding long-form library documents.
    pub collection_wisdom: String,
    /// Collection holding free-text content submitted through the gateway.
    pub collection_wire: String,
    /// Library directories tried in order when resolving catalog files.
    pub library_dirs: Vec<PathBuf>,
    /// Optional JSON catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let openai_api_key = load_env_optional("OPENAI_API_KEY")
            .ok_or_else(|| ConfigError::MissingVariable("OPENAI_API_KEY".to_string()))?;

        let qdrant_url = match load_env_optional("QDRANT_URL") {
            Some(url) => url,
            None => {
                let host = load_env_optional("QDRANT_HOST").unwrap_or_else(|| "localhost".into());
                let port: u16 = parse_env_or("QDRANT_PORT", 6333)?;
                format!("http://{host}:{port}")
            }
        };

        let redis_url = redis_url_from_env()?;

        let library_dirs = match load_env_optional("LIBRARY_DIR") {
            Some(dir) => vec![PathBuf::from(dir)],
            None => vec![
                PathBuf::from(PRIMARY_LIBRARY_DIR),
                PathBuf::from(FALLBACK_LIBRARY_DIR),
            ],
        };

        let embedding_dimension = parse_env_or("EMBEDDING_DIMENSION", DEFAULT_EMBEDDING_DIMENSION)?;
        if embedding_dimension == 0 {
            return Err(ConfigError::InvalidValue("EMBEDDING_DIMENSION".into()));
        }

        Ok(Self {
            openai_api_key,
            openai_base_url: load_env_optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            embedding_model: load_env_optional("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimension,
            qdrant_url,
            qdrant_api_key: load_env_optional("QDRANT_API_KEY"),
            redis_url,
            queue_name: queue_name_from_env(),
            collection_wisdom: load_env_optional("COLLECTION_WISDOM")
                .unwrap_or_else(|| "wisdom".to_string()),
            collection_wire: load_env_optional("COLLECTION_WIRE")
                .unwrap_or_else(|| "wire".to_string()),
            library_dirs,
            catalog_path: load_env_optional("LIBRARY_CATALOG").map(PathBuf::from),
        })
    }

    /// Apply command-line overrides for the catalog file and the library directory.
    ///
    /// An explicit library directory replaces the primary/fallback pair.
    pub fn apply_overrides(&mut self, catalog_path: Option<PathBuf>, library_dir: Option<PathBuf>) {
        if let Some(path) = catalog_path {
            self.catalog_path = Some(path);
        }
        if let Some(dir) = library_dir {
            self.library_dirs = vec![dir];
        }
    }

    /// Log the effective settings, without credentials. Call once tracing is installed.
    pub fn log_summary(&self) {
        tracing::info!(
            qdrant_url = %self.qdrant_url,
            redis_url = %self.redis_url,
            queue = %self.queue_name,
            wisdom = %self.collection_wisdom,
            wire = %self.collection_wire,
            model = %self.embedding_model,
            dimension = self.embedding_dimension,
            library_dirs = ?self.library_dirs,
            catalog = ?self.catalog_path,
            "Loaded configuration"
        );
    }
}

/// Settings needed by the HTTP gateway, which never talks to OpenAI or Qdrant.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Connection URL of the Redis instance backing the task queue.
    pub redis_url: String,
    /// Name of the Redis list used as the task queue.
    pub queue_name: String,
    /// Port to listen on.
    pub port: u16,
}

impl GatewayConfig {
    /// Read the gateway settings from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            redis_url: redis_url_from_env()?,
            queue_name: queue_name_from_env(),
            port: parse_env_or("GATEWAY_PORT", 8080)?,
        })
    }
}

fn redis_url_from_env() -> Result<String, ConfigError> {
    if let Some(url) = load_env_optional("REDIS_URL") {
        return Ok(url);
    }
    let host = load_env_optional("REDIS_HOST").unwrap_or_else(|| "localhost".into());
    let port: u16 = parse_env_or("REDIS_PORT", 6379)?;
    Ok(format!("redis://{host}:{port}/0"))
}

fn queue_name_from_env() -> String {
    load_env_optional("INGESTION_QUEUE").unwrap_or_else(|| DEFAULT_QUEUE_NAME.to_string())
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
        .map(|parsed| parsed.unwrap_or(default))
}

/// Load `.env` (when present) and read the configuration from the environment.
///
/// Callers treat an error as fatal: nothing should run with an unusable credential.
pub fn load_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    Config::from_env()
}

/// Load `.env` (when present) and read the gateway settings.
pub fn load_gateway_config() -> Result<GatewayConfig, ConfigError> {
    dotenvy::dotenv().ok();
    GatewayConfig::from_env()
}
