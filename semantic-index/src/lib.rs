//! Semantic index for knowledge-base documents.
//!
//! Keeps one embedding per document in a Qdrant collection and answers
//! ranked similarity queries over it:
//!
//! - [`compose`] — deterministic embedding-text composition and preview
//!   clamping.
//! - [`embed`] — the embedding provider seam and its Ollama implementation.
//! - [`store`] — the Qdrant-backed vector store (idempotent per-document
//!   upserts, floor-filtered nearest search with deterministic ordering).
//! - [`search`] — the policy layer: default `k`/similarity floor and bounds
//!   validation for caller overrides.
//! - [`sync`] — the embedding synchronizer: fire-and-forget refresh after
//!   document mutation and the reconciliation pass for missing embeddings.
//!
//! The embedding is a best-effort derived artifact: a failed refresh leaves
//! the previous (possibly stale) vector in place and never affects the
//! primary document write.

pub mod compose;
pub mod config;
pub mod embed;
pub mod errors;
pub mod search;
pub mod store;
pub mod sync;

pub use compose::{clamp_preview, compose_embedding_text};
pub use config::IndexConfig;
pub use embed::{EmbeddingsProvider, OllamaEmbedder};
pub use errors::IndexError;
pub use search::{DEFAULT_MIN_SIMILARITY, DEFAULT_TOP_K, MAX_TOP_K, SearchParams};
pub use store::{DocumentRecord, EmbeddingStore, ScoredDocument, SimilaritySearch, VectorStore};
pub use sync::{DocumentContent, DocumentSource, EmbeddingSynchronizer, SyncStats};
