//! Typed error for the retrieval pipeline.
//!
//! The variants follow the pipeline stages: parameter validation fails
//! before any external call; a query-embedding failure is fatal (nothing
//! can be ranked without a query vector); a store failure is fatal.
//! Generation failures are *not* represented here: the composer degrades
//! to a fixed apology instead of failing the request.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    /// Caller-supplied `k`/`minSimilarity` out of bounds.
    #[error("invalid search parameters: {0}")]
    InvalidSearchParameters(String),

    /// Embedding backend unreachable while embedding the query.
    #[error("embedding backend unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Vector store unreachable or erroring during search.
    #[error("vector store unavailable: {0}")]
    StoreUnavailable(String),
}
