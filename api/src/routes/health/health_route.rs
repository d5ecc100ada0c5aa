//! GET /health — backend health snapshot.

use std::sync::Arc;

use axum::{Json, extract::State};
use ai_llm_service::health::{self, HealthStatus};

use crate::core::app_state::AppState;

/// Probes every configured model role (embedding, generation). Always
/// returns 200 with per-role `ok` flags; probe failures are folded into
/// the snapshot rather than the status code.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Vec<HealthStatus>> {
    let mut statuses = Vec::with_capacity(state.model_configs.len());
    for cfg in &state.model_configs {
        statuses.push(health::probe(cfg).await);
    }
    Json(statuses)
}
