//! Unified error type for the semantic-index crate.

use thiserror::Error;

/// Errors produced by the semantic index.
#[derive(Debug, Error)]
pub enum IndexError {
    // ── Configuration / environment ──────────────────────────────────────────
    /// Failed to parse an environment variable into the expected type.
    #[error("failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: String, value: String },

    /// Configuration combination is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Caller input ────────────────────────────────────────────────────────
    /// Caller-supplied search parameters are out of bounds. Rejected before
    /// any external call, never retried.
    #[error("invalid search parameters: {0}")]
    InvalidSearchParameters(String),

    // ── Embedding backend ───────────────────────────────────────────────────
    /// Embedding backend unreachable or rejected the request.
    #[error("embedding backend unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// A vector's dimensionality does not match the configured space.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    // ── Vector store ────────────────────────────────────────────────────────
    /// Underlying persistence/search failure.
    #[error("vector store unavailable: {0}")]
    StoreUnavailable(String),
}
