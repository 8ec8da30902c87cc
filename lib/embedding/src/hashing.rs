//! Feature-hashing embedder
//!
//! Words and character trigrams are hashed into buckets of a fixed-size
//! vector, which is then normalized. Texts sharing vocabulary land close
//! together under cosine similarity, which is enough to rank a seed
//! dataset without an external model.

use crate::{Embedder, Error, Result};
use ahash::RandomState;
use async_trait::async_trait;
use std::hash::BuildHasher;
use wayfarer_core::Vector;

/// Default embedding dimension
pub const DEFAULT_DIM: usize = 256;

// Fixed seeds so vectors stay comparable across process restarts
const SEEDS: (u64, u64, u64, u64) = (
    0x5741_5946_4152_4552,
    0x0123_4567_89ab_cdef,
    0xfedc_ba98_7654_3210,
    0x243f_6a88_85a3_08d3,
);

const WORD_WEIGHT: f32 = 2.0;
const TRIGRAM_WEIGHT: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
    hasher: RandomState,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig("dimension must be positive".to_string()));
        }
        Ok(Self {
            dim,
            hasher: RandomState::with_seeds(SEEDS.0, SEEDS.1, SEEDS.2, SEEDS.3),
        })
    }

    fn bucket(&self, token: &str) -> usize {
        (self.hasher.hash_one(token) % self.dim as u64) as usize
    }

    /// Embed synchronously; the result is always unit length or all zeros
    pub fn embed_text(&self, text: &str) -> Vector {
        let mut components = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();

        for word in normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            components[self.bucket(word)] += WORD_WEIGHT;
        }

        for trigram in trigrams(&normalized) {
            components[self.bucket(&trigram)] += TRIGRAM_WEIGHT;
        }

        let mut vector = Vector::new(components);
        vector.normalize();
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIM,
            hasher: RandomState::with_seeds(SEEDS.0, SEEDS.1, SEEDS.2, SEEDS.3),
        }
    }
}

fn trigrams(s: &str) -> Vec<String> {
    let chars: Vec<char> = s
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .collect();
    if chars.len() < 3 {
        return Vec::new();
    }
    chars.windows(3).map(|w| w.iter().collect()).collect()
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn model(&self) -> &str {
        "feature-hash"
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
