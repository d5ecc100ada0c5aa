//! Embedding synchronizer: keeps the derived vector index in step with
//! document edits, without ever failing the primary write.
//!
//! Two entry points:
//! - [`EmbeddingSynchronizer::spawn_sync`] — detached refresh fired after a
//!   document is created or content-edited. The spawned task outlives the
//!   triggering request; a failure is logged and swallowed, leaving the
//!   previous embedding (or none) in place.
//! - [`EmbeddingSynchronizer::resync_missing`] — reconciliation pass that
//!   finds documents without a stored embedding and fills the gaps.

use std::sync::Arc;
use std::{future::Future, pin::Pin};

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::compose::{clamp_preview, compose_embedding_text};
use crate::embed::EmbeddingsProvider;
use crate::errors::IndexError;
use crate::store::{DocumentRecord, EmbeddingStore};

/// The embeddable content of a document, as read from the document service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContent {
    pub title: String,
    pub body: String,
    pub category: Option<String>,
}

/// True when an update touched a field that feeds the embedding.
///
/// Metadata-only updates (anything outside title/body/category) compare
/// equal here and must not trigger a resync.
pub fn needs_resync(before: &DocumentContent, after: &DocumentContent) -> bool {
    before != after
}

/// Narrow read contract onto the (out-of-scope) document service.
///
/// `document_ids` exists for the reconciliation pass; the synchronizer
/// never depends on the full document lifecycle.
pub trait DocumentSource: Send + Sync {
    /// Full embeddable content for one document, `None` when it no longer
    /// exists.
    fn full_document<'a>(
        &'a self,
        id: u64,
    ) -> Pin<Box<dyn Future<Output = Result<Option<DocumentContent>, IndexError>> + Send + 'a>>;

    /// Ids of all documents that should carry an embedding.
    fn document_ids<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u64>, IndexError>> + Send + 'a>>;
}

/// Outcome counters for a reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Embeddings written.
    pub synced: usize,
    /// Documents skipped (already embedded, or gone by read time).
    pub skipped: usize,
    /// Documents whose refresh failed (logged, not fatal).
    pub failed: usize,
}

/// Regenerates document embeddings and writes them to the vector store.
pub struct EmbeddingSynchronizer {
    store: Arc<dyn EmbeddingStore>,
    embedder: Arc<dyn EmbeddingsProvider>,
    preview_max_chars: usize,
}

impl EmbeddingSynchronizer {
    pub fn new(
        store: Arc<dyn EmbeddingStore>,
        embedder: Arc<dyn EmbeddingsProvider>,
        preview_max_chars: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            preview_max_chars,
        }
    }

    /// Compose, embed and store one document's vector.
    ///
    /// The stored vector is replaced wholesale; on any error nothing is
    /// written and the previous state survives.
    pub async fn sync_document(&self, id: u64, content: &DocumentContent) -> Result<(), IndexError> {
        let text =
            compose_embedding_text(&content.title, &content.body, content.category.as_deref());
        let vector = self.embedder.embed(&text).await?;

        let record = DocumentRecord {
            id,
            title: content.title.clone(),
            preview: clamp_preview(&content.body, self.preview_max_chars),
            category: content.category.clone(),
            synced_at: Utc::now(),
        };

        self.store.write_embedding(&record, vector).await?;
        info!(document_id = id, "embedding synchronized");
        Ok(())
    }

    /// Fire-and-forget refresh after a document mutation.
    ///
    /// The document write has already committed when this runs; an
    /// embedding failure is deliberately non-fatal and leaves the index
    /// stale until the next reconciliation pass. The handle is returned
    /// for callers that want to await completion (tests); production
    /// callers drop it.
    pub fn spawn_sync(self: &Arc<Self>, id: u64, content: DocumentContent) -> JoinHandle<()> {
        let sync = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = sync.sync_document(id, &content).await {
                warn!(
                    document_id = id,
                    error = %err,
                    "embedding sync failed; document keeps its previous embedding"
                );
            }
        })
    }

    /// Embed every document that has no stored vector yet.
    ///
    /// Individual failures are counted and logged but do not abort the
    /// pass; enumeration failures are fatal (there is nothing to iterate).
    pub async fn resync_missing(&self, source: &dyn DocumentSource) -> Result<SyncStats, IndexError> {
        let ids = source.document_ids().await?;
        let have = self.store.embedded_ids().await?;

        let mut stats = SyncStats::default();

        for id in ids {
            if have.contains(&id) {
                stats.skipped += 1;
                continue;
            }

            match source.full_document(id).await {
                Ok(Some(content)) => match self.sync_document(id, &content).await {
                    Ok(()) => stats.synced += 1,
                    Err(err) => {
                        warn!(document_id = id, error = %err, "resync failed for document");
                        stats.failed += 1;
                    }
                },
                Ok(None) => stats.skipped += 1,
                Err(err) => {
                    warn!(document_id = id, error = %err, "could not read document for resync");
                    stats.failed += 1;
                }
            }
        }

        info!(
            synced = stats.synced,
            skipped = stats.skipped,
            failed = stats.failed,
            "reconciliation pass finished"
        );
        Ok(stats)
    }
}
