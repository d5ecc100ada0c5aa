//! Public request/response types of the retrieval pipeline.

use serde::Serialize;

/// Caller overrides for one answer request. Absent fields fall back to the
/// fixed search policy defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerOptions {
    /// Number of documents to retrieve (`1..=10`).
    pub top_k: Option<usize>,
    /// Similarity floor (`0.0..=1.0`).
    pub min_similarity: Option<f32>,
}

/// Ranked document summary echoed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedDocument {
    pub id: u64,
    pub title: String,
    pub similarity: f32,
}

/// Final result of one retrieval-augmented answer request.
///
/// `retrieved_documents` is absent (not null) when nothing cleared the
/// floor; `answer` is always present, with the canned no-match text or the
/// generation fallback standing in when needed.
#[derive(Debug, Serialize)]
pub struct RagAnswer {
    /// The question, echoed.
    pub query: String,
    /// Number of documents that qualified.
    pub found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieved_documents: Option<Vec<RetrievedDocument>>,
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_omits_documents_but_keeps_answer() {
        let out = RagAnswer {
            query: "q".into(),
            found: 0,
            retrieved_documents: None,
            answer: "nothing relevant".into(),
        };
        let v = serde_json::to_value(&out).unwrap();
        assert!(v.get("retrieved_documents").is_none());
        assert_eq!(v["found"], 0);
        assert_eq!(v["answer"], "nothing relevant");
    }

    #[test]
    fn populated_result_serializes_ranked_documents() {
        let out = RagAnswer {
            query: "q".into(),
            found: 1,
            retrieved_documents: Some(vec![RetrievedDocument {
                id: 7,
                title: "Backups".into(),
                similarity: 0.91,
            }]),
            answer: "use snapshots".into(),
        };
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["retrieved_documents"][0]["id"], 7);
        assert_eq!(v["retrieved_documents"][0]["title"], "Backups");
    }
}
