//! POST /rag — retrieval-augmented answer for a free-text question.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use rag::{AnswerOptions, RagError};
use tracing::{debug, error};

use crate::{
    core::app_state::AppState,
    routes::rag::rag_request::{RagErrorResponse, RagQueryRequest},
};

/// Handler: POST /rag
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:3000/rag \
///   -H 'content-type: application/json' \
///   -d '{"q":"how do I back up my data?","limit":4,"min_similarity":0.25}'
/// ```
pub async fn rag_query(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<RagQueryRequest>,
) -> Response {
    let request_id = headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-");

    debug!(request_id = %request_id, query = %body.q, "rag_query: start");

    if body.q.trim().is_empty() {
        let resp = RagErrorResponse {
            error: "q must not be empty".to_string(),
        };
        return (StatusCode::BAD_REQUEST, Json(resp)).into_response();
    }

    let opts = AnswerOptions {
        top_k: body.limit,
        min_similarity: body.min_similarity,
    };

    match state.pipeline.answer(&body.q, opts).await {
        Ok(result) => {
            debug!(
                request_id = %request_id,
                found = result.found,
                "rag_query: success"
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(RagError::InvalidSearchParameters(msg)) => {
            debug!(request_id = %request_id, reason = %msg, "rag_query: rejected");
            let resp = RagErrorResponse { error: msg };
            (StatusCode::BAD_REQUEST, Json(resp)).into_response()
        }
        Err(err) => {
            // Internal diagnostic stays server-side; callers get a generic
            // processing error.
            error!(
                request_id = %request_id,
                error = %err,
                "rag_query: retrieval failed"
            );
            let resp = RagErrorResponse {
                error: "Error while processing the retrieval request.".to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(resp)).into_response()
        }
    }
}
