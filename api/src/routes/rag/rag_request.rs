use serde::{Deserialize, Serialize};

/// Request payload for `POST /rag`.
#[derive(Debug, Deserialize)]
pub struct RagQueryRequest {
    /// Natural language question.
    pub q: String,
    /// Optional override: number of documents to retrieve (1..=10).
    #[serde(default)]
    pub limit: Option<usize>,
    /// Optional override: similarity floor (0.0..=1.0).
    #[serde(default)]
    pub min_similarity: Option<f32>,
}

/// Error payload for rejected/failed requests. The message is safe to show
/// callers; diagnostics stay in the server log.
#[derive(Debug, Serialize)]
pub struct RagErrorResponse {
    pub error: String,
}
