//! Model configurations loaded from environment variables.
//!
//! Two roles exist in this system:
//!
//! - **Generation** — synthesizes the final answer from a RAG prompt.
//!   Sampling parameters are fixed configuration, never per-request input.
//! - **Embedding** — turns document/query text into vectors.
//!
//! # Environment variables
//!
//! - `OLLAMA_URL` or `OLLAMA_PORT` — endpoint (default `http://localhost:11434`)
//! - `OLLAMA_MODEL`     — generation model (default `llama3.1:8b`)
//! - `EMBEDDING_MODEL`  — embedding model (default `nomic-embed-text`)
//! - `LLM_MAX_TOKENS`   — optional generation token cap (default 1800)

use crate::error_handler::{ConfigError, LlmServiceError, env_opt_u32};

/// Configuration for one Ollama model invocation role.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Model identifier (e.g. `"llama3.1:8b"`, `"nomic-embed-text"`).
    pub model: String,

    /// Base endpoint of the Ollama server.
    pub endpoint: String,

    /// Maximum number of tokens to generate (`num_predict`).
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling cutoff.
    pub top_p: Option<f32>,

    /// Top-k sampling cutoff.
    pub top_k: Option<u32>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Resolves the Ollama endpoint from the environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. `http://localhost:11434`
///
/// # Errors
/// [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is not a valid port.
fn ollama_endpoint() -> Result<String, LlmServiceError> {
    if let Ok(url) = std::env::var("OLLAMA_URL") {
        if !url.trim().is_empty() {
            return Ok(url);
        }
    }
    if let Ok(port) = std::env::var("OLLAMA_PORT") {
        if !port.trim().is_empty() {
            port.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
            return Ok(format!("http://localhost:{port}"));
        }
    }
    Ok("http://localhost:11434".to_string())
}

/// Config for the **generation** model.
///
/// Sampling options mirror the production answer pipeline and are fixed
/// here rather than taken from the request.
pub fn generation_config_from_env() -> Result<ModelConfig, LlmServiceError> {
    let endpoint = ollama_endpoint()?;
    let model = std::env::var("OLLAMA_MODEL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "llama3.1:8b".to_string());
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?.or(Some(1800));

    Ok(ModelConfig {
        model,
        endpoint,
        max_tokens,
        temperature: Some(0.65),
        top_p: Some(0.9),
        top_k: Some(40),
        timeout_secs: Some(120),
    })
}

/// Config for the **embedding** model.
pub fn embedding_config_from_env() -> Result<ModelConfig, LlmServiceError> {
    let endpoint = ollama_endpoint()?;
    let model = std::env::var("EMBEDDING_MODEL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "nomic-embed-text".to_string());

    Ok(ModelConfig {
        model,
        endpoint,
        max_tokens: None,
        temperature: None,
        top_p: None,
        top_k: None,
        timeout_secs: Some(30),
    })
}
