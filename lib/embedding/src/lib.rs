//! # Wayfarer Embedding
//!
//! Text embedding providers behind the [`Embedder`] capability.
//!
//! - [`HashEmbedder`] - deterministic feature hashing of words and character
//!   trigrams; needs no network and is the default for local runs and tests
//! - [`OpenAiEmbedder`] - any OpenAI-compatible `/embeddings` endpoint

pub mod error;
pub mod hashing;
pub mod openai;

pub use error::{Error, Result};
pub use hashing::HashEmbedder;
pub use openai::{OpenAiEmbedder, OpenAiEmbedderConfig};

use async_trait::async_trait;
use wayfarer_core::Vector;

/// Turns text into fixed-dimension vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Dimension of every vector this embedder returns
    fn dim(&self) -> usize;

    fn model(&self) -> &str;

    /// Embed a batch, preserving input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>>;

    async fn embed(&self, text: &str) -> Result<Vector> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::InvalidResponse("no embedding returned".to_string()))
    }
}
