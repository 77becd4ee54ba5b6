//! Per-case HNSW vector indexes
//!
//! Similarity search must never cross a case boundary, so there is no
//! global index: each case gets its own HNSW structure, created lazily and
//! rebuildable from SQLite on startup. A query against case A cannot
//! return case B's facts because case B's vectors are not even in the
//! searched structure.

use docket_domain::{CaseId, FactId};
use hnsw_rs::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

const HNSW_M: usize = 16;
const HNSW_EF_CONSTRUCTION: usize = 200;
const HNSW_MAX_ELEMENTS: usize = 100_000;

/// Search quality parameter used for all queries
const HNSW_EF_SEARCH: usize = 64;

/// Errors from vector index operations
#[derive(Error, Debug)]
pub enum VectorIndexError {
    /// Query or inserted vector has the wrong dimension
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension provided
        actual: usize,
    },
}

/// One case's vector index
struct CaseIndex {
    hnsw: Hnsw<'static, f32, DistCosine>,
    ids: HashMap<usize, FactId>,
    next_internal: usize,
}

impl CaseIndex {
    fn new() -> Self {
        let layers = 16.min((HNSW_MAX_ELEMENTS as f32).ln().trunc() as usize);
        Self {
            hnsw: Hnsw::new(
                HNSW_M,
                HNSW_MAX_ELEMENTS,
                layers,
                HNSW_EF_CONSTRUCTION,
                DistCosine {},
            ),
            ids: HashMap::new(),
            next_internal: 0,
        }
    }
}

/// Lazily-created, per-case HNSW indexes over fact embeddings
pub struct CaseVectorIndexes {
    dimension: usize,
    indexes: Mutex<HashMap<CaseId, Arc<Mutex<CaseIndex>>>>,
}

impl CaseVectorIndexes {
    /// Create an index family for `dimension`-length embeddings
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            indexes: Mutex::new(HashMap::new()),
        }
    }

    /// Embedding dimension this family accepts
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn case_index(&self, case_id: CaseId) -> Arc<Mutex<CaseIndex>> {
        let mut map = self.indexes.lock().unwrap();
        Arc::clone(
            map.entry(case_id)
                .or_insert_with(|| Arc::new(Mutex::new(CaseIndex::new()))),
        )
    }

    /// Add one fact's embedding to its case's index
    pub fn add(
        &self,
        case_id: CaseId,
        fact_id: FactId,
        embedding: &[f32],
    ) -> Result<(), VectorIndexError> {
        if embedding.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        let index = self.case_index(case_id);
        let mut index = index.lock().unwrap();
        let internal = index.next_internal;
        index.next_internal += 1;
        index.ids.insert(internal, fact_id);
        index.hnsw.insert((&embedding.to_vec(), internal));
        Ok(())
    }

    /// Nearest neighbours of `query` within one case, as
    /// `(fact_id, cosine_similarity)` pairs sorted most-similar first.
    pub fn search(
        &self,
        case_id: CaseId,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<(FactId, f32)>, VectorIndexError> {
        if query.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let index = {
            let map = self.indexes.lock().unwrap();
            match map.get(&case_id) {
                Some(index) => Arc::clone(index),
                // Case has no facts yet
                None => return Ok(Vec::new()),
            }
        };
        let index = index.lock().unwrap();

        let neighbours = index.hnsw.search(query, k, HNSW_EF_SEARCH);
        Ok(neighbours
            .into_iter()
            .filter_map(|n| {
                index
                    .ids
                    .get(&n.d_id)
                    .map(|&fact_id| (fact_id, 1.0 - n.distance))
            })
            .collect())
    }

    /// Number of vectors stored for one case
    pub fn len(&self, case_id: CaseId) -> usize {
        let map = self.indexes.lock().unwrap();
        map.get(&case_id)
            .map(|index| index.lock().unwrap().ids.len())
            .unwrap_or(0)
    }

    /// Whether one case has no vectors
    pub fn is_empty(&self, case_id: CaseId) -> bool {
        self.len(case_id) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(dim: usize, axis: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[axis] = 1.0;
        v
    }

    #[test]
    fn test_add_and_search() {
        let indexes = CaseVectorIndexes::new(8);
        let case = CaseId::new();

        let near = FactId::new();
        let far = FactId::new();
        indexes.add(case, near, &unit(8, 0)).unwrap();
        indexes.add(case, far, &unit(8, 1)).unwrap();

        let results = indexes.search(case, &unit(8, 0), 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, near);
        assert!(results[0].1 > 0.99);
        assert!(results[1].1 < 0.1);
    }

    #[test]
    fn test_cases_are_disjoint() {
        let indexes = CaseVectorIndexes::new(4);
        let case_a = CaseId::new();
        let case_b = CaseId::new();

        indexes.add(case_a, FactId::new(), &unit(4, 0)).unwrap();

        // Case B searches see nothing from case A
        let results = indexes.search(case_b, &unit(4, 0), 5).unwrap();
        assert!(results.is_empty());
        assert_eq!(indexes.len(case_a), 1);
        assert!(indexes.is_empty(case_b));
    }

    #[test]
    fn test_dimension_mismatch() {
        let indexes = CaseVectorIndexes::new(8);
        let case = CaseId::new();

        let result = indexes.add(case, FactId::new(), &unit(4, 0));
        assert!(matches!(
            result,
            Err(VectorIndexError::DimensionMismatch { expected: 8, actual: 4 })
        ));
        assert!(indexes.search(case, &unit(16, 0), 1).is_err());
    }

    #[test]
    fn test_empty_case_search() {
        let indexes = CaseVectorIndexes::new(4);
        let results = indexes.search(CaseId::new(), &unit(4, 0), 3).unwrap();
        assert!(results.is_empty());
    }
}
