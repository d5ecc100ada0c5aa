//! Qdrant-backed vector store: one point per document, idempotent upserts,
//! and floor-filtered nearest-neighbor search with deterministic ordering.
//!
//! The collection is created with cosine distance, so Qdrant's score *is*
//! the cosine similarity and `score_threshold` implements the similarity
//! floor directly. Equal-score ordering is unspecified at the server, so
//! results are re-sorted client-side with an id tie-break before they are
//! returned.
//!
//! This module does not compose embedding text or call the embedding
//! backend; it is store I/O only.

use std::collections::HashSet;
use std::{future::Future, pin::Pin};

use chrono::{DateTime, Utc};
use qdrant_client::qdrant::{
    CreateCollectionBuilder, DeletePointsBuilder, Distance, PointStruct, PointsIdsList,
    ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
    point_id::PointIdOptions,
};
use qdrant_client::{Payload, Qdrant};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::IndexConfig;
use crate::errors::IndexError;

/// Payload stored alongside a document's vector.
///
/// `synced_at` is the explicit staleness marker: it records when the
/// embedding was computed from the document content, so a reconciliation
/// job can reason about gaps without reading the primary store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: u64,
    pub title: String,
    /// Clamped body preview used for prompt context and list views.
    pub preview: String,
    pub category: Option<String>,
    pub synced_at: DateTime<Utc>,
}

/// A single similarity hit (ranked).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub id: u64,
    pub title: String,
    pub preview: String,
    pub similarity: f32,
}

/// Write half of the store, as seen by the embedding synchronizer.
pub trait EmbeddingStore: Send + Sync {
    /// Replace the stored vector (and payload) for a document. Idempotent.
    fn write_embedding<'a>(
        &'a self,
        record: &'a DocumentRecord,
        vector: Vec<f32>,
    ) -> Pin<Box<dyn Future<Output = Result<(), IndexError>> + Send + 'a>>;

    /// Ids of all documents that currently have a stored embedding.
    fn embedded_ids<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<HashSet<u64>, IndexError>> + Send + 'a>>;
}

/// Read half of the store, as seen by the retrieval pipeline.
pub trait SimilaritySearch: Send + Sync {
    /// At most `k` documents with similarity >= `min_similarity`, ordered by
    /// similarity descending, ties broken by ascending id. Zero qualifying
    /// documents is an empty vec, not an error.
    fn search_nearest<'a>(
        &'a self,
        query_vector: &'a [f32],
        k: usize,
        min_similarity: f32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ScoredDocument>, IndexError>> + Send + 'a>>;
}

/// Vector store bound to one Qdrant collection.
pub struct VectorStore {
    client: Qdrant,
    collection: String,
    dim: usize,
}

const SCROLL_PAGE: u32 = 1024;

impl VectorStore {
    /// Establish a gRPC connection to Qdrant. Does not touch collections.
    ///
    /// # Errors
    /// [`IndexError::StoreUnavailable`] if the client cannot be constructed.
    pub fn connect(cfg: &IndexConfig) -> Result<Self, IndexError> {
        let client = Qdrant::from_url(&cfg.qdrant_url)
            .build()
            .map_err(|e| IndexError::StoreUnavailable(format!("client build: {e}")))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            dim: cfg.dim,
        })
    }

    /// Ensure the collection exists, creating it with cosine distance and
    /// the configured dimension when missing. Existing collections are left
    /// untouched, so embeddings survive restarts.
    pub async fn ensure_collection(&self) -> Result<(), IndexError> {
        match self.client.collection_info(&self.collection).await {
            Ok(_) => {
                debug!(collection = %self.collection, "collection already exists");
                return Ok(());
            }
            Err(err) => {
                warn!(
                    collection = %self.collection,
                    error = %err,
                    "collection not found, will be created"
                );
            }
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dim as u64, Distance::Cosine),
                ),
            )
            .await
            .map_err(|e| IndexError::StoreUnavailable(format!("create_collection: {e}")))?;

        info!(collection = %self.collection, dim = self.dim, "collection created");
        Ok(())
    }

    /// Upsert one document's vector and payload, keyed by document id.
    ///
    /// # Errors
    /// - [`IndexError::VectorSizeMismatch`] if the vector length is wrong.
    /// - [`IndexError::StoreUnavailable`] on transport/server errors.
    pub async fn write_embedding(
        &self,
        record: &DocumentRecord,
        vector: Vec<f32>,
    ) -> Result<(), IndexError> {
        if vector.len() != self.dim {
            return Err(IndexError::VectorSizeMismatch {
                got: vector.len(),
                want: self.dim,
            });
        }

        let payload: Payload = record_payload_json(record)
            .try_into()
            .map_err(|e| IndexError::StoreUnavailable(format!("payload convert: {e}")))?;

        let point = PointStruct::new(record.id, vector, payload);

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]))
            .await
            .map_err(|e| IndexError::StoreUnavailable(format!("upsert_points: {e}")))?;

        debug!(document_id = record.id, "embedding written");
        Ok(())
    }

    /// Remove a document's point. Part of the document delete lifecycle;
    /// deleting an absent point is a no-op.
    pub async fn delete_embedding(&self, id: u64) -> Result<(), IndexError> {
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(PointsIdsList {
                        ids: vec![id.into()],
                    })
                    .wait(true),
            )
            .await
            .map_err(|e| IndexError::StoreUnavailable(format!("delete_points: {e}")))?;

        debug!(document_id = id, "embedding deleted");
        Ok(())
    }

    /// Run k-NN search and map hits to [`ScoredDocument`]s.
    ///
    /// # Errors
    /// - [`IndexError::VectorSizeMismatch`] for a wrong query dimension.
    /// - [`IndexError::StoreUnavailable`] on transport/server errors.
    pub async fn search_nearest(
        &self,
        query_vector: &[f32],
        k: usize,
        min_similarity: f32,
    ) -> Result<Vec<ScoredDocument>, IndexError> {
        if query_vector.len() != self.dim {
            return Err(IndexError::VectorSizeMismatch {
                got: query_vector.len(),
                want: self.dim,
            });
        }

        let builder =
            SearchPointsBuilder::new(&self.collection, query_vector.to_vec(), k as u64)
                .with_payload(true)
                .score_threshold(min_similarity);

        let resp = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| IndexError::StoreUnavailable(format!("search_points: {e}")))?;

        let mut hits: Vec<ScoredDocument> = resp
            .result
            .into_iter()
            .filter_map(map_scored_point)
            .collect();

        rank_hits(&mut hits);

        debug!(hits = hits.len(), "search completed");
        Ok(hits)
    }

    /// Collect the ids of all stored points (ids only, paged scroll).
    pub async fn embedded_ids(&self) -> Result<HashSet<u64>, IndexError> {
        let mut out = HashSet::new();
        let mut offset = None;

        loop {
            let mut builder = ScrollPointsBuilder::new(&self.collection)
                .limit(SCROLL_PAGE)
                .with_payload(false)
                .with_vectors(false);
            if let Some(o) = offset.take() {
                builder = builder.offset(o);
            }

            let resp = self
                .client
                .scroll(builder)
                .await
                .map_err(|e| IndexError::StoreUnavailable(format!("scroll: {e}")))?;

            for point in resp.result {
                if let Some(PointIdOptions::Num(n)) =
                    point.id.and_then(|pid| pid.point_id_options)
                {
                    out.insert(n);
                }
            }

            match resp.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(out)
    }
}

impl EmbeddingStore for VectorStore {
    fn write_embedding<'a>(
        &'a self,
        record: &'a DocumentRecord,
        vector: Vec<f32>,
    ) -> Pin<Box<dyn Future<Output = Result<(), IndexError>> + Send + 'a>> {
        Box::pin(VectorStore::write_embedding(self, record, vector))
    }

    fn embedded_ids<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<HashSet<u64>, IndexError>> + Send + 'a>> {
        Box::pin(VectorStore::embedded_ids(self))
    }
}

impl SimilaritySearch for VectorStore {
    fn search_nearest<'a>(
        &'a self,
        query_vector: &'a [f32],
        k: usize,
        min_similarity: f32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ScoredDocument>, IndexError>> + Send + 'a>> {
        Box::pin(VectorStore::search_nearest(
            self,
            query_vector,
            k,
            min_similarity,
        ))
    }
}

/// Serialize the payload written next to the vector.
fn record_payload_json(record: &DocumentRecord) -> serde_json::Value {
    json!({
        "title": record.title,
        "preview": record.preview,
        "category": record.category,
        "synced_at": record.synced_at.to_rfc3339(),
    })
}

/// Map a Qdrant `ScoredPoint` into a [`ScoredDocument`], best-effort on the
/// payload. Points without a numeric id are skipped; every write in this
/// store keys points by document id.
fn map_scored_point(sp: qdrant_client::qdrant::ScoredPoint) -> Option<ScoredDocument> {
    let id = match sp.id.and_then(|pid| pid.point_id_options) {
        Some(PointIdOptions::Num(n)) => n,
        other => {
            warn!(?other, "skipping point with non-numeric id");
            return None;
        }
    };

    let mut title = String::new();
    let mut preview = String::new();

    if let Some(v) = sp.payload.get("title") {
        if let Some(s) = v.clone().into_json().as_str() {
            title = s.to_owned();
        }
    }
    if let Some(v) = sp.payload.get("preview") {
        if let Some(s) = v.clone().into_json().as_str() {
            preview = s.to_owned();
        }
    }

    Some(ScoredDocument {
        id,
        title,
        preview,
        similarity: sp.score,
    })
}

/// Deterministic ranking: similarity descending, ties broken by ascending
/// document id. Non-comparable scores (NaN) fall through to the id order.
pub fn rank_hits(hits: &mut [ScoredDocument]) {
    hits.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: u64, similarity: f32) -> ScoredDocument {
        ScoredDocument {
            id,
            title: format!("doc {id}"),
            preview: String::new(),
            similarity,
        }
    }

    #[test]
    fn ranking_is_similarity_descending() {
        let mut hits = vec![hit(1, 0.3), hit(2, 0.9), hit(3, 0.6)];
        rank_hits(&mut hits);
        let ids: Vec<u64> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, [2, 3, 1]);
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let mut hits = vec![hit(9, 0.5), hit(2, 0.5), hit(5, 0.5), hit(1, 0.7)];
        rank_hits(&mut hits);
        let ids: Vec<u64> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, [1, 2, 5, 9]);
    }

    #[test]
    fn payload_keeps_absent_category_as_null() {
        let record = DocumentRecord {
            id: 7,
            title: "Backups".into(),
            preview: "Use snapshots.".into(),
            category: None,
            synced_at: Utc::now(),
        };
        let v = record_payload_json(&record);
        assert!(v["category"].is_null());
        assert_eq!(v["title"], "Backups");
        assert!(v["synced_at"].as_str().is_some());
    }
}
