//! Ollama HTTP client for text generation and embeddings.
//!
//! Two endpoints are used:
//! - `POST {endpoint}/api/generate`   — synchronous generation (`stream=false`)
//! - `POST {endpoint}/api/embeddings` — embedding retrieval
//!
//! The client performs exactly one HTTP round-trip per call and maps every
//! failure to [`LlmServiceError`]; retry and fallback policy live with the
//! caller.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::ModelConfig;
use crate::error_handler::{ConfigError, LlmServiceError, Result, body_snippet};

/// Reusable client bound to one model config (one role).
pub struct OllamaClient {
    client: reqwest::Client,
    cfg: ModelConfig,
    url_generate: String,
    url_embeddings: String,
}

impl OllamaClient {
    /// Builds a client for the given config.
    ///
    /// # Errors
    /// - [`ConfigError::InvalidEndpoint`] if the endpoint is blank or not http(s)
    /// - [`LlmServiceError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: ModelConfig) -> Result<Self> {
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ConfigError::InvalidEndpoint(cfg.endpoint.clone()).into());
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_generate = format!("{base}/api/generate");
        let url_embeddings = format!("{base}/api/embeddings");

        Ok(Self {
            client,
            cfg,
            url_generate,
            url_embeddings,
        })
    }

    /// The config this client was built from.
    pub fn config(&self) -> &ModelConfig {
        &self.cfg
    }

    /// Non-streaming generation via `/api/generate`.
    ///
    /// Sampling options (`temperature`, `num_predict`, `top_p`, `top_k`)
    /// come from the config; the prompt is the only per-call input.
    ///
    /// # Errors
    /// [`LlmServiceError::HttpStatus`] for non-2xx responses,
    /// [`LlmServiceError::Transport`] for client errors,
    /// [`LlmServiceError::Decode`] if the body cannot be parsed.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest::from_cfg(&self.cfg, prompt);

        debug!("POST {}", self.url_generate);
        let resp = self
            .client
            .post(&self.url_generate)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_generate.clone();
            let text = resp.text().await.unwrap_or_default();
            return Err(LlmServiceError::HttpStatus {
                status,
                url,
                snippet: body_snippet(&text),
            });
        }

        let out: GenerateResponse = resp.json().await.map_err(|e| {
            LlmServiceError::Decode(format!("serde error: {e}; ensure `stream=false` is used"))
        })?;

        Ok(out.response)
    }

    /// Embedding retrieval via `/api/embeddings`.
    ///
    /// # Errors
    /// Same surface as [`OllamaClient::generate`].
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            prompt: input,
        };

        debug!("POST {}", self.url_embeddings);
        let resp = self
            .client
            .post(&self.url_embeddings)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_embeddings.clone();
            let text = resp.text().await.unwrap_or_default();
            return Err(LlmServiceError::HttpStatus {
                status,
                url,
                snippet: body_snippet(&text),
            });
        }

        let out: EmbeddingsResponse = resp.json().await.map_err(|e| {
            LlmServiceError::Decode(format!("serde error: {e}; expected `{{ embedding: [..] }}`"))
        })?;

        Ok(out.embedding)
    }
}

/* ==========================
HTTP payloads & options
========================== */

/// Request body for `/api/generate` (non-streaming).
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

impl<'a> GenerateRequest<'a> {
    fn from_cfg(cfg: &'a ModelConfig, prompt: &'a str) -> Self {
        let options = GenerateOptions {
            temperature: cfg.temperature,
            num_predict: cfg.max_tokens,
            top_p: cfg.top_p,
            top_k: cfg.top_k,
        };

        Self {
            model: &cfg.model,
            prompt,
            stream: false,
            options: Some(options),
        }
    }
}

/// Subset of Ollama `options` used by this service.
#[derive(Debug, Default, Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

/// Response body for `/api/generate`; the generated text is in `response`.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Request body for `/api/embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response body for `/api/embeddings`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ModelConfig {
        ModelConfig {
            model: "llama3.1:8b".into(),
            endpoint: "http://localhost:11434".into(),
            max_tokens: Some(1800),
            temperature: Some(0.65),
            top_p: Some(0.9),
            top_k: Some(40),
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn generate_request_serializes_fixed_options() {
        let c = cfg();
        let req = GenerateRequest::from_cfg(&c, "hello");
        let v = serde_json::to_value(&req).unwrap();

        assert_eq!(v["model"], "llama3.1:8b");
        assert_eq!(v["prompt"], "hello");
        assert_eq!(v["stream"], false);
        assert_eq!(v["options"]["num_predict"], 1800);
        assert_eq!(v["options"]["top_k"], 40);
        assert!((v["options"]["temperature"].as_f64().unwrap() - 0.65).abs() < 1e-6);
    }

    #[test]
    fn embeddings_request_uses_prompt_field() {
        let req = EmbeddingsRequest {
            model: "nomic-embed-text",
            prompt: "some text",
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["prompt"], "some text");
        assert!(v.get("input").is_none());
    }

    #[test]
    fn rejects_bad_endpoint() {
        let mut c = cfg();
        c.endpoint = "localhost:11434".into();
        assert!(matches!(
            OllamaClient::new(c),
            Err(LlmServiceError::Config(ConfigError::InvalidEndpoint(_)))
        ));
    }
}
