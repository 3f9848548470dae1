use crate::error::{SearchError, SearchResult};
use crate::models::SearchHit;

/// Flat inner-product vector index.
///
/// Vectors are stored contiguously, `dimension` floats per post. All
/// stored vectors and queries are expected to be L2-normalized, so the
/// inner product is the cosine similarity.
#[derive(Clone, Debug)]
pub struct VectorIndex {
    dimension: usize,
    vectors: Vec<f32>,
    post_ids: Vec<i64>,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
            post_ids: Vec::new(),
        }
    }

    /// Rebuild an index from its persisted parts.
    pub fn from_parts(
        dimension: usize,
        post_ids: Vec<i64>,
        vectors: Vec<f32>,
    ) -> SearchResult<Self> {
        if vectors.len() != post_ids.len() * dimension {
            return Err(SearchError::Index(format!(
                "corrupt index: {} floats for {} posts at dimension {}",
                vectors.len(),
                post_ids.len(),
                dimension
            )));
        }
        Ok(Self {
            dimension,
            vectors,
            post_ids,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.post_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.post_ids.is_empty()
    }

    pub fn post_ids(&self) -> &[i64] {
        &self.post_ids
    }

    pub fn vectors(&self) -> &[f32] {
        &self.vectors
    }

    /// Add vectors for `post_ids`. A post already present keeps both
    /// entries; callers replace posts by rebuilding.
    pub fn add(&mut self, post_ids: &[i64], vectors: &[Vec<f32>]) -> SearchResult<()> {
        if post_ids.len() != vectors.len() {
            return Err(SearchError::Index(format!(
                "{} ids but {} vectors",
                post_ids.len(),
                vectors.len()
            )));
        }

        for vector in vectors {
            if vector.len() != self.dimension {
                return Err(SearchError::Index(format!(
                    "expected dimension {}, got {}",
                    self.dimension,
                    vector.len()
                )));
            }
        }

        self.post_ids.extend_from_slice(post_ids);
        for vector in vectors {
            self.vectors.extend_from_slice(vector);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.vectors.clear();
        self.post_ids.clear();
    }

    /// Top-`k` posts by inner product against `query`, optionally
    /// dropping hits below `min_score`. Ties break on ascending post id.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        min_score: Option<f32>,
    ) -> SearchResult<Vec<SearchHit>> {
        if query.len() != self.dimension {
            return Err(SearchError::Index(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension
            )));
        }

        let mut hits: Vec<SearchHit> = self
            .post_ids
            .iter()
            .zip(self.vectors.chunks_exact(self.dimension))
            .map(|(&post_id, vector)| SearchHit {
                post_id,
                similarity_score: dot(query, vector),
            })
            .collect();

        if let Some(threshold) = min_score {
            hits.retain(|hit| hit.similarity_score >= threshold);
        }

        hits.sort_by(|a, b| {
            b.similarity_score
                .total_cmp(&a.similarity_score)
                .then(a.post_id.cmp(&b.post_id))
        });
        hits.truncate(k);
        Ok(hits)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
