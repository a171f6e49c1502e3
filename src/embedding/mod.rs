//! Embedding provider implementations.
//!
//! Concrete backends for the core [`EmbeddingProvider`] trait:
//! - **[`LocalProvider`]**: runs a sentence-transformer locally via fastembed
//!   (default `all-minilm-l6-v2`); no network calls after the model download.
//! - **[`OllamaProvider`]**: calls a local Ollama instance's `/api/embed`.
//! - **[`OpenAIProvider`]**: calls the OpenAI embeddings API.
//! - **[`HashProvider`]**: FNV-1a feature hashing; offline and instant, for
//!   development and tests.
//!
//! # Provider Selection
//!
//! Use [`create_provider`] to build the provider named in the configuration.
//! Construction is where model weights are loaded or credentials checked;
//! a failure there is reported once as
//! [`RetrievalError::EmbeddingUnavailable`] and never retried.
//!
//! ```rust,no_run
//! # use pratibodh::config::EmbeddingConfig;
//! # use pratibodh::embedding::create_provider;
//! # async fn demo() -> anyhow::Result<()> {
//! let config = EmbeddingConfig { provider: "hash".into(), ..Default::default() };
//! let provider = create_provider(&config).await?;
//! assert_eq!(provider.dims(), 256);
//! # Ok(())
//! # }
//! ```
//!
//! # Retry Strategy
//!
//! The OpenAI and Ollama providers retry individual requests with
//! exponential backoff:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

mod hash;
#[cfg(feature = "local-embeddings-fastembed")]
mod local;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use pratibodh_core::RetrievalError;

use crate::config::EmbeddingConfig;

pub use hash::{HashProvider, DEFAULT_HASH_DIMS};
#[cfg(feature = "local-embeddings-fastembed")]
pub use local::LocalProvider;
pub use pratibodh_core::embedding::{cosine_similarity, EmbeddingProvider};

/// Create the [`EmbeddingProvider`] named by `config.provider`.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"local"` | [`LocalProvider`] (fastembed) |
/// | `"ollama"` | [`OllamaProvider`] |
/// | `"openai"` | [`OpenAIProvider`] |
/// | `"hash"` | [`HashProvider`] |
pub async fn create_provider(
    config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingProvider>, RetrievalError> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider.as_str() {
        "hash" => Arc::new(HashProvider::new(config.dims.unwrap_or(DEFAULT_HASH_DIMS))),
        "ollama" => Arc::new(OllamaProvider::new(config)?),
        "openai" => Arc::new(OpenAIProvider::new(config)?),
        #[cfg(feature = "local-embeddings-fastembed")]
        "local" => Arc::new(LocalProvider::load(config).await?),
        #[cfg(not(feature = "local-embeddings-fastembed"))]
        "local" => {
            return Err(RetrievalError::EmbeddingUnavailable(
                "Local embedding provider requires --features local-embeddings-fastembed"
                    .to_string(),
            ))
        }
        other => {
            return Err(RetrievalError::EmbeddingUnavailable(format!(
                "Unknown embedding provider: {}",
                other
            )))
        }
    };

    tracing::info!(
        provider = %config.provider,
        model = provider.model_name(),
        dims = provider.dims(),
        "embedding provider ready"
    );
    Ok(provider)
}

// ============ OpenAI Provider ============

/// Embedding provider using the OpenAI API.
///
/// Calls `POST /v1/embeddings` with the configured model. Requires the
/// `OPENAI_API_KEY` environment variable, checked at construction.
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dims: usize,
    batch_size: usize,
    max_retries: u32,
}

impl OpenAIProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, RetrievalError> {
        let (model, dims) = remote_model(config, "OpenAI")?;
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            RetrievalError::EmbeddingUnavailable(
                "OPENAI_API_KEY environment variable not set".to_string(),
            )
        })?;

        Ok(Self {
            client: http_client(config)?,
            api_key,
            model,
            dims,
            batch_size: config.batch_size.max(1),
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let body = serde_json::json!({
                "model": self.model,
                "input": batch,
            });
            let json = send_with_retry(
                || {
                    self.client
                        .post("https://api.openai.com/v1/embeddings")
                        .header("Authorization", format!("Bearer {}", self.api_key))
                        .json(&body)
                },
                self.max_retries,
                "OpenAI",
            )
            .await?;
            let vectors = parse_openai_response(&json)?;
            check_batch(&vectors, batch.len(), self.dims)?;
            out.extend(vectors);
        }
        Ok(out)
    }
}

/// Extract `data[].embedding`, ordered by `data[].index` when present.
fn parse_openai_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| anyhow!("Invalid OpenAI response: missing data array"))?;

    let mut indexed = Vec::with_capacity(data.len());
    for (pos, item) in data.iter().enumerate() {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| anyhow!("Invalid OpenAI response: missing embedding"))?;
        let index = item
            .get("index")
            .and_then(|i| i.as_u64())
            .map(|i| i as usize)
            .unwrap_or(pos);
        indexed.push((index, to_f32_vec(embedding)));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}

// ============ Ollama Provider ============

/// Embedding provider using a local Ollama instance.
///
/// Calls `POST /api/embed` on the configured URL (default
/// `http://localhost:11434`). Requires an embedding model pulled into
/// Ollama (e.g. `ollama pull nomic-embed-text`).
pub struct OllamaProvider {
    client: reqwest::Client,
    url: String,
    model: String,
    dims: usize,
    batch_size: usize,
    max_retries: u32,
}

impl OllamaProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, RetrievalError> {
        let (model, dims) = remote_model(config, "Ollama")?;
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        Ok(Self {
            client: http_client(config)?,
            url: url.trim_end_matches('/').to_string(),
            model,
            dims,
            batch_size: config.batch_size.max(1),
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let endpoint = format!("{}/api/embed", self.url);
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let body = serde_json::json!({
                "model": self.model,
                "input": batch,
            });
            let json = send_with_retry(
                || self.client.post(&endpoint).json(&body),
                self.max_retries,
                "Ollama",
            )
            .await?;
            let vectors = parse_ollama_response(&json)?;
            check_batch(&vectors, batch.len(), self.dims)?;
            out.extend(vectors);
        }
        Ok(out)
    }
}

fn parse_ollama_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let embeddings = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| anyhow!("Invalid Ollama response: missing embeddings array"))?;

    embeddings
        .iter()
        .map(|embedding| {
            embedding
                .as_array()
                .map(|values| to_f32_vec(values))
                .ok_or_else(|| anyhow!("Invalid Ollama response: embedding is not an array"))
        })
        .collect()
}

// ============ Shared HTTP plumbing ============

fn remote_model(config: &EmbeddingConfig, service: &str) -> Result<(String, usize), RetrievalError> {
    let model = config.model.clone().ok_or_else(|| {
        RetrievalError::EmbeddingUnavailable(format!("embedding.model required for {} provider", service))
    })?;
    let dims = config.dims.ok_or_else(|| {
        RetrievalError::EmbeddingUnavailable(format!("embedding.dims required for {} provider", service))
    })?;
    Ok((model, dims))
}

fn http_client(config: &EmbeddingConfig) -> Result<reqwest::Client, RetrievalError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| RetrievalError::EmbeddingUnavailable(format!("HTTP client: {}", e)))
}

/// Exponential backoff: 1s, 2s, 4s, ... capped at 32s.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 << (attempt.saturating_sub(1)).min(5))
}

/// Send a request built by `build`, retrying 429/5xx and network errors.
async fn send_with_retry<F>(build: F, max_retries: u32, service: &str) -> Result<serde_json::Value>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = backoff_delay(attempt);
            tracing::debug!(service, attempt, ?delay, "retrying embedding request");
            tokio::time::sleep(delay).await;
        }

        match build().send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return Ok(response.json().await?);
                }

                let body_text = response.text().await.unwrap_or_default();

                // Rate limited or server error: retry
                if status.as_u16() == 429 || status.is_server_error() {
                    last_err = Some(anyhow!("{} API error {}: {}", service, status, body_text));
                    continue;
                }

                bail!("{} API error {}: {}", service, status, body_text);
            }
            Err(e) => {
                last_err = Some(anyhow!("{} connection error: {}", service, e));
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("{} embedding failed after retries", service)))
}

fn to_f32_vec(values: &[serde_json::Value]) -> Vec<f32> {
    values
        .iter()
        .map(|v| v.as_f64().unwrap_or(0.0) as f32)
        .collect()
}

/// A response must carry one vector per input, each of `dims` components.
fn check_batch(vectors: &[Vec<f32>], expected_len: usize, dims: usize) -> Result<()> {
    if vectors.len() != expected_len {
        bail!(
            "expected {} embeddings in response, got {}",
            expected_len,
            vectors.len()
        );
    }
    if let Some(v) = vectors.iter().find(|v| v.len() != dims) {
        bail!("expected {}-dimensional embeddings, got {}", dims, v.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_openai_orders_by_index() {
        let json = json!({
            "data": [
                {"index": 1, "embedding": [0.0, 1.0]},
                {"index": 0, "embedding": [1.0, 0.5]}
            ]
        });
        let vectors = parse_openai_response(&json).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.5], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_parse_openai_missing_data() {
        let err = parse_openai_response(&json!({"error": "nope"})).unwrap_err();
        assert!(err.to_string().contains("missing data array"));
    }

    #[test]
    fn test_parse_ollama() {
        let json = json!({"embeddings": [[0.25, -1.0], [2.0, 0.0]]});
        let vectors = parse_ollama_response(&json).unwrap();
        assert_eq!(vectors, vec![vec![0.25, -1.0], vec![2.0, 0.0]]);

        assert!(parse_ollama_response(&json!({"embeddings": [1.0]})).is_err());
        assert!(parse_ollama_response(&json!({})).is_err());
    }

    #[test]
    fn test_check_batch() {
        let vectors = vec![vec![0.0; 3], vec![0.0; 3]];
        assert!(check_batch(&vectors, 2, 3).is_ok());
        assert!(check_batch(&vectors, 3, 3).is_err());
        assert!(check_batch(&vectors, 2, 4).is_err());
    }

    #[test]
    fn test_backoff_delay() {
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(2));
        assert_eq!(backoff_delay(4), Duration::from_secs(8));
        assert_eq!(backoff_delay(6), Duration::from_secs(32));
        assert_eq!(backoff_delay(20), Duration::from_secs(32));
    }

    #[tokio::test]
    async fn test_create_hash_provider() {
        let config = EmbeddingConfig {
            provider: "hash".to_string(),
            dims: Some(64),
            ..Default::default()
        };
        let provider = create_provider(&config).await.unwrap();
        assert_eq!(provider.dims(), 64);
        assert_eq!(provider.embed_one("duty").await.unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_unknown_provider_is_unavailable() {
        let config = EmbeddingConfig {
            provider: "magic".to_string(),
            ..Default::default()
        };
        let err = create_provider(&config).await.err().unwrap();
        assert!(matches!(err, RetrievalError::EmbeddingUnavailable(_)));
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let config = EmbeddingConfig {
            provider: "ollama".to_string(),
            model: Some("nomic-embed-text".to_string()),
            dims: Some(768),
            batch_size: 0,
            ..Default::default()
        };
        let provider = OllamaProvider::new(&config).unwrap();
        assert_eq!(provider.batch_size, 1);
    }

    #[tokio::test]
    async fn test_ollama_requires_model() {
        let config = EmbeddingConfig {
            provider: "ollama".to_string(),
            dims: Some(768),
            ..Default::default()
        };
        let err = create_provider(&config).await.err().unwrap();
        assert!(matches!(err, RetrievalError::EmbeddingUnavailable(msg) if msg.contains("embedding.model")));
    }
}
