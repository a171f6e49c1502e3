//! Query-time orchestration: text in, one verse out.
//!
//! Startup builds state in a fixed order and hands it to a [`Retriever`]:
//!
//! 1. Normalize or load a [`Corpus`].
//! 2. Construct the [`EmbeddingProvider`] (loads model weights once).
//! 3. [`CorpusIndex::build`] batch-embeds every verse's retrieval text.
//!
//! The resulting [`CorpusIndex`] is never mutated, so it is shared behind
//! an `Arc` and read concurrently without locking.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::corpus::Corpus;
use crate::embedding::EmbeddingProvider;
use crate::error::RetrievalError;
use crate::index::SimilarityIndex;
use crate::models::Verse;

/// A corpus paired with its ordinal-aligned embeddings.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    corpus: Corpus,
    index: SimilarityIndex,
}

impl CorpusIndex {
    /// Embed every verse with `provider` and index the vectors.
    ///
    /// An empty corpus produces an empty index without calling the provider.
    pub async fn build(
        corpus: Corpus,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Self, RetrievalError> {
        if corpus.is_empty() {
            tracing::warn!("building index over an empty corpus");
            return Self::from_parts(corpus, Vec::new());
        }

        let started = Instant::now();
        let vectors = provider
            .embed(&corpus.retrieval_texts())
            .await
            .map_err(|e| RetrievalError::EmbeddingFailed(format!("{:#}", e)))?;

        if let Some(v) = vectors.first() {
            let expected = provider.dims();
            if expected > 0 && v.len() != expected {
                return Err(RetrievalError::DimensionMismatch {
                    expected,
                    got: v.len(),
                });
            }
        }

        let built = Self::from_parts(corpus, vectors)?;
        tracing::info!(
            verses = built.corpus.len(),
            dims = built.index.dims(),
            model = provider.model_name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "corpus index built"
        );
        Ok(built)
    }

    /// Pair a corpus with precomputed vectors (`vectors[i]` embeds verse `i`).
    pub fn from_parts(corpus: Corpus, vectors: Vec<Vec<f32>>) -> Result<Self, RetrievalError> {
        if corpus.len() != vectors.len() {
            return Err(RetrievalError::Misaligned {
                records: corpus.len(),
                vectors: vectors.len(),
            });
        }
        let index = SimilarityIndex::build(vectors)?;
        Ok(Self { corpus, index })
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }
}

/// The single best verse for a query.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalHit<'a> {
    pub ordinal: usize,
    pub score: f32,
    pub verse: &'a Verse,
}

/// Answers queries against a shared [`CorpusIndex`].
#[derive(Clone)]
pub struct Retriever {
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<CorpusIndex>,
}

impl Retriever {
    /// `index` must have been built with the same `provider` (same model),
    /// otherwise query and corpus vectors live in different spaces.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, index: Arc<CorpusIndex>) -> Self {
        Self { provider, index }
    }

    pub fn corpus(&self) -> &Corpus {
        self.index.corpus()
    }

    pub fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    /// Return the verse whose retrieval text is most similar to `query`.
    ///
    /// Blank queries fail with [`RetrievalError::EmptyQuery`] and an empty
    /// corpus with [`RetrievalError::EmptyIndex`]; both are detected before
    /// the provider is called.
    pub async fn retrieve(&self, query: &str) -> Result<RetrievalHit<'_>, RetrievalError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }
        if self.index.index().is_empty() {
            return Err(RetrievalError::EmptyIndex);
        }

        let query_vec = self
            .provider
            .embed_one(query)
            .await
            .map_err(|e| RetrievalError::EmbeddingFailed(format!("{:#}", e)))?;

        let best = self.index.index().query(&query_vec)?;
        let verse = self
            .index
            .corpus()
            .get(best.ordinal)
            .ok_or(RetrievalError::Misaligned {
                records: self.index.corpus().len(),
                vectors: self.index.index().len(),
            })?;

        tracing::debug!(id = %verse.id, score = best.score, "retrieved verse");

        Ok(RetrievalHit {
            ordinal: best.ordinal,
            score: best.score,
            verse,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, NormalizeOptions};
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Bag-of-letters embedding: counts of `a..=z`. Deterministic and
    /// good enough to make distinct texts land apart.
    struct LetterProvider {
        calls: AtomicUsize,
    }

    impl LetterProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for LetterProvider {
        fn model_name(&self) -> &str {
            "letters"
        }
        fn dims(&self) -> usize {
            26
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0f32; 26];
                    for c in t.to_ascii_lowercase().bytes() {
                        if c.is_ascii_lowercase() {
                            v[(c - b'a') as usize] += 1.0;
                        }
                    }
                    v
                })
                .collect())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl EmbeddingProvider for FailingProvider {
        fn model_name(&self) -> &str {
            "failing"
        }
        fn dims(&self) -> usize {
            4
        }
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            anyhow::bail!("model went away")
        }
    }

    fn corpus() -> Corpus {
        let raw = vec![
            json!({"chapter_number": 2, "verse_number": 47, "meaning_en": "Do your duty without attachment to results"}),
            json!({"chapter_number": 1, "verse_number": 1, "meaning_en": "Listen well, Sanjaya, what happened on the field"}),
            json!({"chapter_number": 6, "verse_number": 5, "meaning_en": "Elevate yourself through the power of your mind"}),
            json!({"chapter_number": 18, "verse_number": 66, "meaning_en": "Abandon all varieties of dharma and surrender unto me"}),
        ];
        normalize(&raw, &NormalizeOptions::default()).corpus
    }

    async fn retriever(provider: Arc<LetterProvider>) -> Retriever {
        let index = CorpusIndex::build(corpus(), provider.as_ref()).await.unwrap();
        Retriever::new(provider, Arc::new(index))
    }

    #[tokio::test]
    async fn test_self_match() {
        let provider = Arc::new(LetterProvider::new());
        let r = retriever(provider).await;
        for verse in r.corpus().iter() {
            let hit = r.retrieve(&verse.retrieval_text).await.unwrap();
            assert_eq!(hit.verse.id, verse.id);
        }
    }

    #[tokio::test]
    async fn test_returns_one_verse_from_corpus() {
        let provider = Arc::new(LetterProvider::new());
        let r = retriever(provider).await;
        for q in ["why should I act?", "zzz", "?", "मन"] {
            let hit = r.retrieve(q).await.unwrap();
            assert!(r.corpus().iter().any(|v| v.id == hit.verse.id));
            assert_eq!(r.corpus().get(hit.ordinal), Some(hit.verse));
        }
    }

    #[tokio::test]
    async fn test_blank_query_never_embeds() {
        let provider = Arc::new(LetterProvider::new());
        let r = retriever(provider.clone()).await;
        let before = provider.calls.load(Ordering::SeqCst);

        assert!(matches!(r.retrieve("").await, Err(RetrievalError::EmptyQuery)));
        assert!(matches!(r.retrieve("   \n\t").await, Err(RetrievalError::EmptyQuery)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn test_empty_corpus() {
        let provider = Arc::new(LetterProvider::new());
        let index = CorpusIndex::build(Corpus::default(), provider.as_ref())
            .await
            .unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        let r = Retriever::new(provider.clone(), Arc::new(index));
        assert!(matches!(r.retrieve("duty").await, Err(RetrievalError::EmptyIndex)));
        assert!(matches!(r.retrieve(" ").await, Err(RetrievalError::EmptyQuery)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_build_embeds_once_in_corpus_order() {
        let provider = LetterProvider::new();
        let c = corpus();
        let index = CorpusIndex::build(c.clone(), &provider).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(index.index().len(), c.len());

        let expected = provider.embed(&c.retrieval_texts()).await.unwrap();
        for (i, v) in expected.iter().enumerate() {
            assert_eq!(index.index().vector(i), Some(v.as_slice()));
        }
    }

    #[tokio::test]
    async fn test_provider_failure_is_named() {
        let err = CorpusIndex::build(corpus(), &FailingProvider).await.unwrap_err();
        assert!(matches!(err, RetrievalError::EmbeddingFailed(msg) if msg.contains("model went away")));
    }

    #[test]
    fn test_from_parts_checks_alignment() {
        let err = CorpusIndex::from_parts(corpus(), vec![vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::Misaligned {
                records: 4,
                vectors: 1
            }
        ));
    }
}
