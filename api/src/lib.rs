//! HTTP surface of the knowledge-base RAG backend.
//!
//! Routes:
//! - `POST /rag`    — retrieval-augmented answer for a free-text question
//! - `GET  /health` — Ollama health snapshot for both model roles

use std::{env, error::Error, sync::Arc};

mod core;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::info;

use crate::core::app_state::AppState;
use crate::routes::{health::health_route::health, rag::rag_query_route::rag_query};

pub async fn start() -> Result<(), Box<dyn Error>> {
    let state = Arc::new(AppState::from_env().await?);

    let app = Router::new()
        .route("/rag", post(rag_query))
        .route("/health", get(health))
        .with_state(state);

    let host_url = env::var("API_ADDRESS").unwrap_or_else(|_| "127.0.0.1:3000".into());

    let listener = tokio::net::TcpListener::bind(&host_url).await?;
    info!(address = %host_url, "API listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
}
