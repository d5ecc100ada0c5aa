//! Health probes for the Ollama backend.
//!
//! A probe is a `GET {endpoint}/api/tags` with a best-effort check that the
//! configured model is present in the tag list. [`probe`] never returns an
//! error: failures are folded into the snapshot (`ok = false`) so it can
//! back a `/health` endpoint directly.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ModelConfig;

/// Serializable health snapshot for one model config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model the config points at.
    pub model: String,
    /// Whether the backend answered and the model looked available.
    pub ok: bool,
    /// Round-trip latency of the probe.
    pub latency_ms: u128,
    /// Failure detail when `ok` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

/// Probes one Ollama config. Infallible by design: errors become `ok = false`.
pub async fn probe(cfg: &ModelConfig) -> HealthStatus {
    let started = Instant::now();
    let detail = match try_probe(cfg).await {
        Ok(()) => None,
        Err(detail) => {
            warn!(endpoint = %cfg.endpoint, model = %cfg.model, %detail, "health probe failed");
            Some(detail)
        }
    };

    HealthStatus {
        endpoint: cfg.endpoint.clone(),
        model: cfg.model.clone(),
        ok: detail.is_none(),
        latency_ms: started.elapsed().as_millis(),
        detail,
    }
}

async fn try_probe(cfg: &ModelConfig) -> Result<(), String> {
    let url = format!("{}/api/tags", cfg.endpoint.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs.unwrap_or(10)))
        .build()
        .map_err(|e| format!("http client build: {e}"))?;

    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| format!("GET {url}: {e}"))?;

    if !resp.status().is_success() {
        return Err(format!("GET {url}: HTTP {}", resp.status()));
    }

    let tags: TagsResponse = resp
        .json()
        .await
        .map_err(|e| format!("parse tags response: {e}"))?;

    // Tag names may carry a ":latest" suffix the config omits.
    let wanted = cfg.model.as_str();
    let present = tags
        .models
        .iter()
        .any(|m| m.name == wanted || m.name.strip_suffix(":latest") == Some(wanted));

    if present {
        Ok(())
    } else {
        Err(format!("model '{wanted}' not found in tag list"))
    }
}
