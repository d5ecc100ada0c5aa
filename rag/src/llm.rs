//! Answer generator seam and its Ollama implementation.

use std::{future::Future, pin::Pin};

use ai_llm_service::OllamaClient;
use thiserror::Error;

/// Any failure of the generation backend. Callers degrade on it rather
/// than propagate it.
#[derive(Debug, Error)]
#[error("generation backend unavailable: {0}")]
pub struct GenerationError(pub String);

/// Backend interface for answer synthesis.
pub trait AnswerGenerator: Send + Sync {
    /// Generate free text for a fully built prompt. No internal retry.
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;
}

/// Ollama-backed generator using the generation-role client.
pub struct OllamaGenerator {
    client: OllamaClient,
}

impl OllamaGenerator {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

impl AnswerGenerator for OllamaGenerator {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>> {
        Box::pin(async move {
            self.client
                .generate(prompt)
                .await
                .map_err(|e| GenerationError(e.to_string()))
        })
    }
}
