//! Search policy layer: defaults and bounds for caller-supplied knobs.
//!
//! Thin by design: validation happens here, before any external call,
//! so an out-of-bounds request never reaches the embedding backend or the
//! store.

use crate::errors::IndexError;
use crate::store::{ScoredDocument, SimilaritySearch};

/// Result count used when the caller does not override `k`.
pub const DEFAULT_TOP_K: usize = 4;

/// Similarity floor used when the caller does not override it.
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.25;

/// Upper bound for caller-supplied `k`.
pub const MAX_TOP_K: usize = 10;

/// Validated search knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    pub top_k: usize,
    pub min_similarity: f32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }
}

impl SearchParams {
    /// Apply defaults for absent overrides and validate the rest.
    ///
    /// Bounds: `1 <= k <= 10`, `0.0 <= min_similarity <= 1.0` (finite).
    ///
    /// # Errors
    /// [`IndexError::InvalidSearchParameters`] for out-of-bounds values.
    pub fn resolve(top_k: Option<usize>, min_similarity: Option<f32>) -> Result<Self, IndexError> {
        let defaults = Self::default();

        let top_k = top_k.unwrap_or(defaults.top_k);
        if !(1..=MAX_TOP_K).contains(&top_k) {
            return Err(IndexError::InvalidSearchParameters(format!(
                "k must be within 1..={MAX_TOP_K}, got {top_k}"
            )));
        }

        let min_similarity = min_similarity.unwrap_or(defaults.min_similarity);
        if !min_similarity.is_finite() || !(0.0..=1.0).contains(&min_similarity) {
            return Err(IndexError::InvalidSearchParameters(format!(
                "minSimilarity must be within 0.0..=1.0, got {min_similarity}"
            )));
        }

        Ok(Self {
            top_k,
            min_similarity,
        })
    }
}

/// Run a nearest search with validated parameters.
pub async fn search_nearest(
    index: &dyn SimilaritySearch,
    query_vector: &[f32],
    params: SearchParams,
) -> Result<Vec<ScoredDocument>, IndexError> {
    index
        .search_nearest(query_vector, params.top_k, params.min_similarity)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let p = SearchParams::resolve(None, None).unwrap();
        assert_eq!(p.top_k, 4);
        assert!((p.min_similarity - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn k_bounds_are_inclusive() {
        assert!(SearchParams::resolve(Some(1), None).is_ok());
        assert!(SearchParams::resolve(Some(10), None).is_ok());

        for bad in [0, 11, 100] {
            assert!(matches!(
                SearchParams::resolve(Some(bad), None),
                Err(IndexError::InvalidSearchParameters(_))
            ));
        }
    }

    #[test]
    fn similarity_floor_bounds_are_inclusive() {
        assert!(SearchParams::resolve(None, Some(0.0)).is_ok());
        assert!(SearchParams::resolve(None, Some(1.0)).is_ok());

        for bad in [-0.1_f32, 1.1, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                SearchParams::resolve(None, Some(bad)),
                Err(IndexError::InvalidSearchParameters(_))
            ));
        }
    }
}
