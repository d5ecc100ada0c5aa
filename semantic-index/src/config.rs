//! Runtime settings for the semantic index, read from environment variables.

use crate::errors::IndexError;

/// Connectivity and shape of the vector space.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// gRPC URL for Qdrant (e.g. "http://localhost:6334").
    pub qdrant_url: String,
    /// Collection holding one point per document.
    pub collection: String,
    /// Embedding vector dimensionality (fixed by the embedding model).
    pub dim: usize,
    /// Maximum characters kept in the stored content preview.
    pub preview_max_chars: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            qdrant_url: "http://localhost:6334".to_string(),
            collection: "kb_documents".to_string(),
            dim: 768,
            preview_max_chars: 600,
        }
    }
}

impl IndexConfig {
    /// Build configuration from environment variables.
    ///
    /// Variables used (all optional):
    /// - `QDRANT_URL` (default: "http://localhost:6334")
    /// - `QDRANT_COLLECTION` (default: "kb_documents")
    /// - `EMBEDDING_DIM` (default: 768)
    /// - `PREVIEW_MAX_CHARS` (default: 600)
    ///
    /// # Errors
    /// [`IndexError::EnvParse`] for malformed numbers,
    /// [`IndexError::InvalidConfig`] for a zero dimension.
    pub fn from_env() -> Result<Self, IndexError> {
        let defaults = Self::default();

        let cfg = Self {
            qdrant_url: std::env::var("QDRANT_URL").unwrap_or(defaults.qdrant_url),
            collection: std::env::var("QDRANT_COLLECTION").unwrap_or(defaults.collection),
            dim: read_usize_env("EMBEDDING_DIM")?.unwrap_or(defaults.dim),
            preview_max_chars: read_usize_env("PREVIEW_MAX_CHARS")?
                .unwrap_or(defaults.preview_max_chars),
        };

        if cfg.dim == 0 {
            return Err(IndexError::InvalidConfig("EMBEDDING_DIM must be > 0".into()));
        }

        Ok(cfg)
    }
}

/// Read an optional `usize` from env (`Ok(None)` if unset).
fn read_usize_env(key: &str) -> Result<Option<usize>, IndexError> {
    match std::env::var(key) {
        Ok(v) => v
            .parse::<usize>()
            .map(Some)
            .map_err(|_| IndexError::EnvParse {
                key: key.into(),
                value: v,
            }),
        Err(_) => Ok(None),
    }
}
