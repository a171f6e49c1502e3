//! FNV-1a feature-hashing embedder.
//!
//! Each lowercase word token is hashed with FNV-1a into one of `dims`
//! buckets, with the top hash bit choosing the sign. The resulting
//! term-count vector is L2-normalized. No model, no network: useful for
//! offline runs and tests, but it only captures word overlap.

use anyhow::Result;
use async_trait::async_trait;

use pratibodh_core::EmbeddingProvider;

pub const DEFAULT_HASH_DIMS: usize = 256;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

pub struct HashProvider {
    dims: usize,
}

impl HashProvider {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    /// Embed one text synchronously. Empty or punctuation-only text
    /// yields the zero vector.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        for token in tokens(text) {
            let h = fnv1a(token.as_bytes());
            let bucket = (h % self.dims as u64) as usize;
            let sign = if h >> 63 == 1 { -1.0 } else { 1.0 };
            v[bucket] += sign;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for HashProvider {
    fn model_name(&self) -> &str {
        "fnv1a-hash"
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Lowercased word tokens. Splits on whitespace, ASCII punctuation, and
/// the Devanagari danda marks.
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| {
        c.is_whitespace()
            || c.is_ascii_punctuation()
            || matches!(c, '।' | '॥' | '—' | '–' | '‘' | '’' | '“' | '”')
    })
    .filter(|t| !t.is_empty())
    .map(str::to_lowercase)
}
