//! Retrieval-augmented answering over the semantic index.
//!
//! Public API: [`RagPipeline::answer`]. It validates the caller's search
//! knobs, embeds the question, retrieves the top-ranked documents above the
//! similarity floor, builds a fixed-structure prompt, asks the generation
//! backend and assembles the final result.
//!
//! Failure policy follows the pipeline order: invalid parameters and a
//! failed query embedding abort the request (nothing can be ranked);
//! a store failure aborts; a generation failure degrades to a fixed
//! apology while the retrieval results are still returned. Zero qualifying
//! documents short-circuits with a canned answer and never touches the
//! generation backend.

mod api_types;
mod error;
pub mod llm;
pub mod prompt;

pub use api_types::{AnswerOptions, RagAnswer, RetrievedDocument};
pub use error::RagError;
pub use llm::{AnswerGenerator, GenerationError, OllamaGenerator};

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use semantic_index::{
    EmbeddingsProvider, IndexError, SearchParams, SimilaritySearch, search::search_nearest,
};

use prompt::{GENERATION_FALLBACK, NO_MATCH_ANSWER, build_prompt};

/// One-pass retrieval pipeline. Stateless between requests; every field is
/// a shared handle, so the pipeline itself is cheap to clone into handlers.
#[derive(Clone)]
pub struct RagPipeline {
    embedder: Arc<dyn EmbeddingsProvider>,
    index: Arc<dyn SimilaritySearch>,
    generator: Arc<dyn AnswerGenerator>,
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingsProvider>,
        index: Arc<dyn SimilaritySearch>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        Self {
            embedder,
            index,
            generator,
        }
    }

    /// Answer a free-text question from the indexed documents.
    ///
    /// # Errors
    /// - [`RagError::InvalidSearchParameters`] before any external call
    /// - [`RagError::EmbeddingUnavailable`] if the query cannot be embedded
    /// - [`RagError::StoreUnavailable`] if the similarity search fails
    pub async fn answer(
        &self,
        question: &str,
        opts: AnswerOptions,
    ) -> Result<RagAnswer, RagError> {
        // 1) Validate knobs first; an out-of-bounds request must fail
        //    before the embedding backend is contacted.
        let params =
            SearchParams::resolve(opts.top_k, opts.min_similarity).map_err(|e| match e {
                IndexError::InvalidSearchParameters(msg) => RagError::InvalidSearchParameters(msg),
                other => RagError::InvalidSearchParameters(other.to_string()),
            })?;

        // 2) Embed the question. Fatal on failure: without a query vector
        //    there is nothing to rank.
        let query_vector = self.embedder.embed(question).await.map_err(|e| match e {
            IndexError::EmbeddingUnavailable(msg) => RagError::EmbeddingUnavailable(msg),
            other => RagError::EmbeddingUnavailable(other.to_string()),
        })?;
        debug!(dim = query_vector.len(), "query embedded");

        // 3) Ranked similarity search above the floor.
        let hits = search_nearest(&*self.index, &query_vector, params)
            .await
            .map_err(|e| match e {
                IndexError::StoreUnavailable(msg) => RagError::StoreUnavailable(msg),
                other => RagError::StoreUnavailable(other.to_string()),
            })?;

        if hits.is_empty() {
            info!(query = question, "no document cleared the similarity floor");
            return Ok(RagAnswer {
                query: question.to_string(),
                found: 0,
                retrieved_documents: None,
                answer: NO_MATCH_ANSWER.to_string(),
            });
        }

        // 4) Compose the prompt from the ranked context and generate.
        let prompt = build_prompt(question, &hits);
        let answer = match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("generation backend returned empty text");
                GENERATION_FALLBACK.to_string()
            }
            Err(err) => {
                error!(error = %err, "generation failed, degrading to fallback answer");
                GENERATION_FALLBACK.to_string()
            }
        };

        // 5) Assemble. Similarities are coerced to finite numbers so the
        //    response never carries a NaN/inf artifact from the store.
        let retrieved = hits
            .iter()
            .map(|h| RetrievedDocument {
                id: h.id,
                title: h.title.clone(),
                similarity: if h.similarity.is_finite() {
                    h.similarity
                } else {
                    0.0
                },
            })
            .collect::<Vec<_>>();

        Ok(RagAnswer {
            query: question.to_string(),
            found: retrieved.len(),
            retrieved_documents: Some(retrieved),
            answer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use semantic_index::ScoredDocument;
    use semantic_index::store::rank_hits;

    /// Deterministic embedder over a fixed text → vector table, counting
    /// calls so tests can assert it was (not) reached.
    struct TableEmbedder {
        vectors: HashMap<String, Vec<f32>>,
        calls: AtomicUsize,
    }

    impl TableEmbedder {
        fn new(entries: &[(&str, &[f32])]) -> Self {
            Self {
                vectors: entries
                    .iter()
                    .map(|(t, v)| (t.to_string(), v.to_vec()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl EmbeddingsProvider for TableEmbedder {
        fn embed<'a>(
            &'a self,
            text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, IndexError>> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let found = self.vectors.get(text).cloned();
            Box::pin(async move {
                found.ok_or_else(|| {
                    IndexError::EmbeddingUnavailable("no vector for text".into())
                })
            })
        }
    }

    struct DownEmbedder;

    impl EmbeddingsProvider for DownEmbedder {
        fn embed<'a>(
            &'a self,
            _text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, IndexError>> + Send + 'a>> {
            Box::pin(async move {
                Err(IndexError::EmbeddingUnavailable(
                    "connection refused".into(),
                ))
            })
        }
    }

    /// In-memory cosine index over stored vectors.
    struct MemoryIndex {
        docs: Vec<(u64, &'static str, &'static str, Vec<f32>)>,
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
        if a.len() != b.len() || a.is_empty() {
            return None;
        }
        let mut dot = 0.0f64;
        let mut norm_a = 0.0f64;
        let mut norm_b = 0.0f64;
        for (&x, &y) in a.iter().zip(b.iter()) {
            dot += f64::from(x) * f64::from(y);
            norm_a += f64::from(x) * f64::from(x);
            norm_b += f64::from(y) * f64::from(y);
        }
        let denom = norm_a.sqrt() * norm_b.sqrt();
        if denom <= f64::EPSILON {
            return None;
        }
        Some(dot / denom)
    }

    impl SimilaritySearch for MemoryIndex {
        fn search_nearest<'a>(
            &'a self,
            query_vector: &'a [f32],
            k: usize,
            min_similarity: f32,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<ScoredDocument>, IndexError>> + Send + 'a>>
        {
            let mut hits: Vec<ScoredDocument> = self
                .docs
                .iter()
                .filter_map(|(id, title, preview, vector)| {
                    let sim = cosine_similarity(vector, query_vector)? as f32;
                    (sim >= min_similarity).then(|| ScoredDocument {
                        id: *id,
                        title: title.to_string(),
                        preview: preview.to_string(),
                        similarity: sim,
                    })
                })
                .collect();
            rank_hits(&mut hits);
            hits.truncate(k);
            Box::pin(async move { Ok(hits) })
        }
    }

    /// Index that always fails, for the store-unavailable path.
    struct DownIndex;

    impl SimilaritySearch for DownIndex {
        fn search_nearest<'a>(
            &'a self,
            _query_vector: &'a [f32],
            _k: usize,
            _min_similarity: f32,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<ScoredDocument>, IndexError>> + Send + 'a>>
        {
            Box::pin(async move { Err(IndexError::StoreUnavailable("search_points: io".into())) })
        }
    }

    /// Index returning fixed hits regardless of the query.
    struct FixedIndex {
        hits: Vec<ScoredDocument>,
    }

    impl SimilaritySearch for FixedIndex {
        fn search_nearest<'a>(
            &'a self,
            _query_vector: &'a [f32],
            _k: usize,
            _min_similarity: f32,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<ScoredDocument>, IndexError>> + Send + 'a>>
        {
            let hits = self.hits.clone();
            Box::pin(async move { Ok(hits) })
        }
    }

    struct FakeGenerator {
        response: Result<String, String>,
        calls: AtomicUsize,
    }

    impl FakeGenerator {
        fn ok(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn down() -> Self {
            Self {
                response: Err("model not loaded".to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl AnswerGenerator for FakeGenerator {
        fn generate<'a>(
            &'a self,
            _prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let out = self.response.clone().map_err(GenerationError);
            Box::pin(async move { out })
        }
    }

    const QUERY: &str = "how to back up data";
    const QUERY_VEC: [f32; 3] = [0.95, 0.05, 0.0];

    fn backup_pipeline(
        generator: Arc<FakeGenerator>,
    ) -> (Arc<TableEmbedder>, RagPipeline) {
        let embedder = Arc::new(TableEmbedder::new(&[(QUERY, &QUERY_VEC)]));
        let index = Arc::new(MemoryIndex {
            docs: vec![(1, "Backups", "Use snapshots.", vec![1.0, 0.0, 0.0])],
        });
        let pipeline = RagPipeline::new(embedder.clone(), index, generator);
        (embedder, pipeline)
    }

    #[tokio::test]
    async fn invalid_parameters_fail_before_any_backend_call() {
        let generator = Arc::new(FakeGenerator::ok("unused"));
        let (embedder, pipeline) = backup_pipeline(generator.clone());

        for opts in [
            AnswerOptions {
                top_k: Some(0),
                ..Default::default()
            },
            AnswerOptions {
                top_k: Some(11),
                ..Default::default()
            },
            AnswerOptions {
                min_similarity: Some(1.5),
                ..Default::default()
            },
            AnswerOptions {
                min_similarity: Some(-0.5),
                ..Default::default()
            },
        ] {
            let err = pipeline.answer(QUERY, opts).await.unwrap_err();
            assert!(matches!(err, RagError::InvalidSearchParameters(_)));
        }

        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn boundary_parameters_are_accepted() {
        for (k, floor) in [(1, 0.0_f32), (10, 1.0)] {
            let generator = Arc::new(FakeGenerator::ok("fine"));
            let (_, pipeline) = backup_pipeline(generator);
            let opts = AnswerOptions {
                top_k: Some(k),
                min_similarity: Some(floor),
            };
            assert!(pipeline.answer(QUERY, opts).await.is_ok());
        }
    }

    #[tokio::test]
    async fn zero_matches_short_circuits_without_generation() {
        let generator = Arc::new(FakeGenerator::ok("unused"));
        let (_, pipeline) = backup_pipeline(generator.clone());

        // A floor above every stored similarity.
        let opts = AnswerOptions {
            min_similarity: Some(1.0),
            ..Default::default()
        };
        let out = pipeline.answer(QUERY, opts).await.unwrap();

        assert_eq!(out.found, 0);
        assert!(out.retrieved_documents.is_none());
        assert_eq!(out.answer, NO_MATCH_ANSWER);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn retrieves_embedded_document_for_related_query() {
        let generator = Arc::new(FakeGenerator::ok("Snapshots are the way to go."));
        let (_, pipeline) = backup_pipeline(generator);

        let opts = AnswerOptions {
            min_similarity: Some(0.1),
            ..Default::default()
        };
        let out = pipeline.answer(QUERY, opts).await.unwrap();

        assert_eq!(out.query, QUERY);
        assert_eq!(out.found, 1);
        let docs = out.retrieved_documents.unwrap();
        assert_eq!(docs[0].id, 1);
        assert_eq!(docs[0].title, "Backups");
        assert!(docs[0].similarity >= 0.1 && docs[0].similarity <= 1.0);
        assert_eq!(out.answer, "Snapshots are the way to go.");
    }

    #[tokio::test]
    async fn generation_failure_degrades_but_keeps_retrieval() {
        let generator = Arc::new(FakeGenerator::down());
        let (_, pipeline) = backup_pipeline(generator);

        let opts = AnswerOptions {
            min_similarity: Some(0.1),
            ..Default::default()
        };
        let out = pipeline.answer(QUERY, opts).await.unwrap();

        assert_eq!(out.found, 1);
        assert!(out.retrieved_documents.is_some());
        assert_eq!(out.answer, GENERATION_FALLBACK);
    }

    #[tokio::test]
    async fn empty_generation_falls_back_too() {
        let generator = Arc::new(FakeGenerator::ok("   \n"));
        let (_, pipeline) = backup_pipeline(generator);

        let opts = AnswerOptions {
            min_similarity: Some(0.1),
            ..Default::default()
        };
        let out = pipeline.answer(QUERY, opts).await.unwrap();
        assert_eq!(out.answer, GENERATION_FALLBACK);
    }

    #[tokio::test]
    async fn embedding_failure_is_fatal() {
        let pipeline = RagPipeline::new(
            Arc::new(DownEmbedder),
            Arc::new(MemoryIndex { docs: vec![] }),
            Arc::new(FakeGenerator::ok("unused")),
        );

        let err = pipeline.answer(QUERY, AnswerOptions::default()).await.unwrap_err();
        assert!(matches!(err, RagError::EmbeddingUnavailable(_)));
    }

    #[tokio::test]
    async fn store_failure_is_fatal() {
        let embedder = Arc::new(TableEmbedder::new(&[(QUERY, &QUERY_VEC)]));
        let pipeline = RagPipeline::new(
            embedder,
            Arc::new(DownIndex),
            Arc::new(FakeGenerator::ok("unused")),
        );

        let err = pipeline.answer(QUERY, AnswerOptions::default()).await.unwrap_err();
        assert!(matches!(err, RagError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn results_keep_rank_order_with_id_tie_break() {
        let embedder = Arc::new(TableEmbedder::new(&[(QUERY, &QUERY_VEC)]));
        let index = Arc::new(MemoryIndex {
            docs: vec![
                // Same direction → same similarity; ids must break the tie.
                (9, "dup b", "p", vec![1.0, 0.0, 0.0]),
                (2, "dup a", "p", vec![2.0, 0.0, 0.0]),
                (5, "closest", "p", vec![0.95, 0.05, 0.0]),
            ],
        });
        let pipeline = RagPipeline::new(embedder, index, Arc::new(FakeGenerator::ok("ok")));

        let opts = AnswerOptions {
            min_similarity: Some(0.1),
            ..Default::default()
        };
        let out = pipeline.answer(QUERY, opts).await.unwrap();
        let ids: Vec<u64> = out
            .retrieved_documents
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();

        assert_eq!(ids, [5, 2, 9]);
    }

    #[tokio::test]
    async fn non_finite_similarity_is_coerced_to_zero() {
        let embedder = Arc::new(TableEmbedder::new(&[(QUERY, &QUERY_VEC)]));
        let index = Arc::new(FixedIndex {
            hits: vec![ScoredDocument {
                id: 1,
                title: "broken score".into(),
                preview: "p".into(),
                similarity: f32::NAN,
            }],
        });
        let pipeline = RagPipeline::new(embedder, index, Arc::new(FakeGenerator::ok("ok")));

        let out = pipeline.answer(QUERY, AnswerOptions::default()).await.unwrap();
        let docs = out.retrieved_documents.unwrap();
        assert_eq!(docs[0].similarity, 0.0);
    }
}
