//! Query embedding — text in, fixed-length vector out.
//!
//! Failures are per query: the caller gets an empty vector and skips the
//! case. There are no retries.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{EmbeddingProvider, ProbeConfig};
use crate::{ProbeError, ProbeResult};

/// Anything that can turn a query into a vector.
///
/// An empty vector means "no embedding available for this query".
pub trait Embedder {
    fn embed(&self, text: &str) -> Vec<f32>;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

/// OpenAI-compatible `/v1/embeddings` client (OpenRouter or OpenAI).
pub struct HttpEmbedder {
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl HttpEmbedder {
    pub fn new(provider: &EmbeddingProvider, model: &str, timeout: Duration) -> Self {
        Self {
            endpoint: provider.kind.endpoint().to_string(),
            api_key: provider.api_key.clone(),
            model: model.to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(&config.provider, &config.model, config.request_timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, text: &str) -> ProbeResult<Vec<f32>> {
        let body = EmbeddingRequest { model: &self.model, input: text };

        let mut response = ureq::post(&self.endpoint)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .config()
            .timeout_global(Some(self.timeout))
            .build()
            .send_json(&body)
            .map_err(|e| ProbeError::Embedding(e.to_string()))?;

        let parsed: EmbeddingResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| ProbeError::Embedding(format!("Malformed response: {}", e)))?;

        first_embedding(parsed)
    }
}

fn first_embedding(response: EmbeddingResponse) -> ProbeResult<Vec<f32>> {
    response
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| ProbeError::Embedding("Response has no data entries".to_string()))
}

impl Embedder for HttpEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        match self.request(text) {
            Ok(vector) => {
                tracing::debug!(dims = vector.len(), "Query embedded");
                vector
            }
            Err(e) => {
                tracing::warn!(error = %e, endpoint = %self.endpoint, "Embedding API error");
                Vec::new()
            }
        }
    }
}
