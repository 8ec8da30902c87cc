use crate::{Embedder, Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use wayfarer_core::Vector;

#[derive(Debug, Clone)]
pub struct OpenAiEmbedderConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub dimensions: usize,
    pub timeout: Duration,
}

/// Client for an OpenAI-compatible `POST {api_base}/embeddings` endpoint
pub struct OpenAiEmbedder {
    client: Client,
    config: OpenAiEmbedderConfig,
}

impl OpenAiEmbedder {
    pub fn new(config: OpenAiEmbedderConfig) -> Result<Self> {
        if config.model.is_empty() {
            return Err(Error::InvalidConfig("embedding model is not set".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn dim(&self) -> usize {
        self.config.dimensions
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/embeddings", self.config.api_base.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.config.model,
            "input": texts,
            "dimensions": self.config.dimensions,
        });
        debug!(model = %self.config.model, inputs = texts.len(), "requesting embeddings");

        let res = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let json: Value = res.error_for_status()?.json().await?;

        let vectors = parse_embedding_response(json)?;
        if vectors.len() != texts.len() {
            return Err(Error::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vector>> {
    let data = json
        .get("data")
        .and_then(|v| v.as_array())
        .ok_or_else(|| Error::InvalidResponse("response is missing data array".to_string()))?;

    let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());
    for (fallback_index, item) in data.iter().enumerate() {
        let index = item
            .get("index")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(fallback_index);
        let embedding = item
            .get("embedding")
            .and_then(|v| v.as_array())
            .ok_or_else(|| Error::InvalidResponse("item missing embedding array".to_string()))?;
        let mut vec = Vec::with_capacity(embedding.len());
        for value in embedding {
            let number = value
                .as_f64()
                .ok_or_else(|| Error::InvalidResponse("embedding value must be numeric".to_string()))?;
            vec.push(number as f32);
        }
        indexed.push((index, vec));
    }

    indexed.sort_by_key(|(index, _)| *index);

    Ok(indexed.into_iter().map(|(_, vec)| Vector::new(vec)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_embeddings_in_index_order() {
        let json = serde_json::json!({
            "data": [
                { "index": 1, "embedding": [2.0, 3.0] },
                { "index": 0, "embedding": [0.5, 1.5] }
            ]
        });
        let parsed = parse_embedding_response(json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].as_slice(), &[0.5, 1.5]);
        assert_eq!(parsed[1].as_slice(), &[2.0, 3.0]);
    }

    #[test]
    fn test_missing_data_is_invalid_response() {
        let err = parse_embedding_response(serde_json::json!({"error": "quota"})).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[test]
    fn test_empty_model_rejected() {
        let config = OpenAiEmbedderConfig {
            api_base: "http://localhost".to_string(),
            api_key: "sk-test-key-123".to_string(),
            model: String::new(),
            dimensions: 8,
            timeout: Duration::from_secs(1),
        };
        assert!(matches!(OpenAiEmbedder::new(config), Err(Error::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_unavailable() {
        let embedder = OpenAiEmbedder::new(OpenAiEmbedderConfig {
            api_base: "http://127.0.0.1:9".to_string(),
            api_key: "sk-test-key-123".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 8,
            timeout: Duration::from_millis(500),
        })
        .unwrap();
        let err = embedder.embed("hello").await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
    }
}
