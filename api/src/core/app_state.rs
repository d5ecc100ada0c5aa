//! Shared state for all HTTP handlers.

use std::{error::Error, sync::Arc};

use ai_llm_service::{
    ModelConfig, OllamaClient,
    config::{embedding_config_from_env, generation_config_from_env},
    health,
};
use rag::{OllamaGenerator, RagPipeline};
use semantic_index::{IndexConfig, OllamaEmbedder, VectorStore};
use tracing::warn;

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// The retrieval pipeline behind `POST /rag`.
    pub pipeline: RagPipeline,
    /// Model configs probed by `GET /health` (embedding, generation).
    pub model_configs: Vec<ModelConfig>,
}

impl AppState {
    /// Load shared state from environment variables and connect the
    /// external clients.
    ///
    /// The Qdrant collection is created here when missing; if the store is
    /// unreachable at startup the server still comes up (searches will
    /// fail per-request until it returns). A failing embedding-model probe
    /// is reported as a warning the same way.
    pub async fn from_env() -> Result<Self, Box<dyn Error>> {
        let index_cfg = IndexConfig::from_env()?;
        let embedding_cfg = embedding_config_from_env()?;
        let generation_cfg = generation_config_from_env()?;

        let store = VectorStore::connect(&index_cfg)?;
        if let Err(err) = store.ensure_collection().await {
            warn!(error = %err, "could not ensure vector collection at startup");
        }

        let embedder = OllamaEmbedder::new(OllamaClient::new(embedding_cfg.clone())?, index_cfg.dim);
        let generator = OllamaGenerator::new(OllamaClient::new(generation_cfg.clone())?);

        let startup_probe = health::probe(&embedding_cfg).await;
        if !startup_probe.ok {
            warn!(
                model = %embedding_cfg.model,
                "embedding model not ready; run `ollama pull {}`",
                embedding_cfg.model
            );
        }

        let pipeline = RagPipeline::new(
            Arc::new(embedder),
            Arc::new(store),
            Arc::new(generator),
        );

        Ok(Self {
            pipeline,
            model_configs: vec![embedding_cfg, generation_cfg],
        })
    }
}
