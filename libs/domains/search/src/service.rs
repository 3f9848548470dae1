use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use domain_posts::{PostRepository, SearchFilter};
use tracing::instrument;

use crate::embedder::TextEmbedder;
use crate::error::{SearchError, SearchResult};
use crate::models::{SearchHit, SearchOutcome};
use crate::store::VectorStore;

const SEMANTIC_WEIGHT: f32 = 0.6;
const KEYWORD_WEIGHT: f32 = 0.4;

/// Runs semantic and hybrid searches over the indexed post corpus.
pub struct SearchService<R, E> {
    repository: Arc<R>,
    embedder: Arc<E>,
    store: Arc<VectorStore>,
}

impl<R, E> SearchService<R, E>
where
    R: PostRepository,
    E: TextEmbedder,
{
    pub fn new(repository: Arc<R>, embedder: Arc<E>, store: Arc<VectorStore>) -> Self {
        Self {
            repository,
            embedder,
            store,
        }
    }

    /// Pure vector search: embed the query, rank by cosine similarity,
    /// keep only posts visible under `filter`.
    #[instrument(skip(self, query, filter))]
    pub async fn semantic(
        &self,
        query: &str,
        limit: usize,
        filter: &SearchFilter,
        min_score: Option<f32>,
    ) -> SearchResult<SearchOutcome> {
        let results = self
            .semantic_candidates(query, limit, filter, min_score)
            .await?;

        Ok(SearchOutcome {
            total_found: results.len(),
            results,
        })
    }

    /// Blend of vector similarity and keyword matching.
    ///
    /// Fetches twice `limit` semantic candidates, unions them with the
    /// keyword matches, and scores each post as
    /// `0.6 * semantic + 0.4 * keyword_indicator` where the indicator is
    /// 1 for posts matching the keyword query and 0 otherwise.
    #[instrument(skip(self, query, filter))]
    pub async fn hybrid(
        &self,
        query: &str,
        limit: usize,
        filter: &SearchFilter,
        min_score: Option<f32>,
    ) -> SearchResult<SearchOutcome> {
        let semantic = self
            .semantic_candidates(query, limit * 2, filter, min_score)
            .await?;
        let keyword: HashSet<i64> = self
            .repository
            .keyword_search_ids(query, filter)
            .await?
            .into_iter()
            .collect();

        let semantic_scores: HashMap<i64, f32> = semantic
            .iter()
            .map(|hit| (hit.post_id, hit.similarity_score))
            .collect();

        let mut results: Vec<SearchHit> = semantic_scores
            .iter()
            .map(|(&post_id, &score)| SearchHit {
                post_id,
                similarity_score: SEMANTIC_WEIGHT * score
                    + if keyword.contains(&post_id) {
                        KEYWORD_WEIGHT
                    } else {
                        0.0
                    },
            })
            .collect();

        for &post_id in &keyword {
            if !semantic_scores.contains_key(&post_id) {
                results.push(SearchHit {
                    post_id,
                    similarity_score: KEYWORD_WEIGHT,
                });
            }
        }

        results.sort_by(|a, b| {
            b.similarity_score
                .total_cmp(&a.similarity_score)
                .then(a.post_id.cmp(&b.post_id))
        });
        results.truncate(limit);

        Ok(SearchOutcome {
            total_found: results.len(),
            results,
        })
    }

    async fn semantic_candidates(
        &self,
        query: &str,
        k: usize,
        filter: &SearchFilter,
        min_score: Option<f32>,
    ) -> SearchResult<Vec<SearchHit>> {
        let vector = self.embed_query(query)?;
        let hits = self.store.search(&vector, k, min_score)?;
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let candidate_ids: Vec<i64> = hits.iter().map(|hit| hit.post_id).collect();
        let visible: HashSet<i64> = self
            .repository
            .find_visible_ids(&candidate_ids, filter)
            .await?
            .into_iter()
            .collect();

        Ok(hits
            .into_iter()
            .filter(|hit| visible.contains(&hit.post_id))
            .collect())
    }

    fn embed_query(&self, query: &str) -> SearchResult<Vec<f32>> {
        let mut embeddings = self.embedder.embed(&[query.to_string()])?;
        embeddings
            .pop()
            .ok_or_else(|| SearchError::Embedding("model returned no vector for query".to_string()))
    }
}
