//! Local sentence-transformer inference via fastembed.
//!
//! The ONNX model is downloaded from Hugging Face on first use and cached.
//! It is loaded exactly once, in [`LocalProvider::load`], and then shared
//! by corpus and query embedding. Inference runs on `spawn_blocking`
//! behind a `Mutex` because fastembed's `embed` takes `&mut self`.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use pratibodh_core::{EmbeddingProvider, RetrievalError};

use crate::config::EmbeddingConfig;

/// all-MiniLM-L6-v2, 384 dimensions.
pub const DEFAULT_LOCAL_MODEL: &str = "all-minilm-l6-v2";

pub struct LocalProvider {
    model: Arc<Mutex<fastembed::TextEmbedding>>,
    model_name: String,
    dims: usize,
    batch_size: usize,
}

impl LocalProvider {
    /// Load (downloading if needed) the configured model and probe its
    /// dimensionality by embedding the empty string.
    pub async fn load(config: &EmbeddingConfig) -> Result<Self, RetrievalError> {
        let model_name = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_LOCAL_MODEL.to_string());
        let fastembed_model = config_to_fastembed_model(&model_name)?;
        let cache_dir = config.cache_dir.clone();

        tracing::info!(model = %model_name, "loading local embedding model");

        let (model, dims) = tokio::task::spawn_blocking(move || {
            let mut options =
                fastembed::InitOptions::new(fastembed_model).with_show_download_progress(true);
            if let Some(dir) = cache_dir {
                options = options.with_cache_dir(dir);
            }
            let mut model = fastembed::TextEmbedding::try_new(options)
                .map_err(|e| anyhow!("Failed to initialize local embedding model: {}", e))?;
            let probe = model
                .embed(vec![String::new()], None)
                .map_err(|e| anyhow!("Local embedding probe failed: {}", e))?;
            let dims = probe.first().map(Vec::len).unwrap_or(0);
            Ok::<_, anyhow::Error>((model, dims))
        })
        .await
        .map_err(|e| RetrievalError::EmbeddingUnavailable(e.to_string()))?
        .map_err(|e| RetrievalError::EmbeddingUnavailable(format!("{:#}", e)))?;

        if let Some(expected) = config.dims {
            if expected != dims {
                return Err(RetrievalError::EmbeddingUnavailable(format!(
                    "embedding.dims is {} but model '{}' produces {}-dimensional vectors",
                    expected, model_name, dims
                )));
            }
        }

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            model_name,
            dims,
            batch_size: config.batch_size.max(1),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalProvider {
    fn model_name(&self) -> &str {
        &self.model_name
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        let batch_size = self.batch_size;

        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|e| anyhow!("Failed to acquire model lock: {}", e))?;
            model
                .embed(texts, Some(batch_size))
                .map_err(|e| anyhow!("Local embedding failed: {}", e))
        })
        .await?
    }
}

fn config_to_fastembed_model(name: &str) -> Result<fastembed::EmbeddingModel, RetrievalError> {
    match name {
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        "bge-large-en-v1.5" => Ok(fastembed::EmbeddingModel::BGELargeENV15),
        "nomic-embed-text-v1.5" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV15),
        "multilingual-e5-small" => Ok(fastembed::EmbeddingModel::MultilingualE5Small),
        "multilingual-e5-base" => Ok(fastembed::EmbeddingModel::MultilingualE5Base),
        "multilingual-e5-large" => Ok(fastembed::EmbeddingModel::MultilingualE5Large),
        other => Err(RetrievalError::EmbeddingUnavailable(format!(
            "Unknown local embedding model: '{}'. Supported models: \
             all-minilm-l6-v2, bge-small-en-v1.5, bge-base-en-v1.5, bge-large-en-v1.5, \
             nomic-embed-text-v1.5, multilingual-e5-small, multilingual-e5-base, \
             multilingual-e5-large",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_model_names() {
        assert!(config_to_fastembed_model("all-minilm-l6-v2").is_ok());
        assert!(config_to_fastembed_model("multilingual-e5-small").is_ok());
    }

    #[test]
    fn test_unknown_model_is_unavailable() {
        let err = config_to_fastembed_model("gpt-embed-9000").unwrap_err();
        assert!(matches!(err, RetrievalError::EmbeddingUnavailable(msg) if msg.contains("gpt-embed-9000")));
    }
}
