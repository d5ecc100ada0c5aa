//! Thin client layer for the local Ollama runtime.
//!
//! The knowledge-base pipeline talks to two Ollama models: a generation
//! model (answer synthesis) and an embedding model (semantic indexing).
//! Both roles share one client type, [`ollama::OllamaClient`], configured
//! per role through [`config::ModelConfig`].
//!
//! The crate deliberately stays policy-free: no retries, no fallbacks.
//! Callers decide what a failed call means for them.

pub mod config;
pub mod error_handler;
pub mod health;
pub mod ollama;

pub use config::ModelConfig;
pub use error_handler::{ConfigError, LlmServiceError};
pub use health::HealthStatus;
pub use ollama::OllamaClient;
