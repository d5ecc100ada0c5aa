//! Embedding provider seam and its Ollama implementation.
//!
//! Async is required because real providers perform HTTP requests.

use std::{future::Future, pin::Pin};

use ai_llm_service::OllamaClient;

use crate::errors::IndexError;

/// Provider interface for embedding generation.
///
/// Implement this trait to plug in a different embedding backend. The
/// contract is a pure text → vector mapping with no internal retry; every
/// backend failure surfaces as [`IndexError::EmbeddingUnavailable`].
pub trait EmbeddingsProvider: Send + Sync {
    /// Embed one text into a vector of the configured dimension.
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, IndexError>> + Send + 'a>>;
}

/// Ollama-backed embedding provider.
pub struct OllamaEmbedder {
    client: OllamaClient,
    dim: usize,
}

impl OllamaEmbedder {
    /// Wrap an embedding-role client, pinning the expected dimension.
    pub fn new(client: OllamaClient, dim: usize) -> Self {
        Self { client, dim }
    }
}

impl EmbeddingsProvider for OllamaEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, IndexError>> + Send + 'a>> {
        Box::pin(async move {
            let vector = self
                .client
                .embed(text)
                .await
                .map_err(|e| IndexError::EmbeddingUnavailable(e.to_string()))?;

            if vector.len() != self.dim {
                return Err(IndexError::VectorSizeMismatch {
                    got: vector.len(),
                    want: self.dim,
                });
            }

            Ok(vector)
        })
    }
}
