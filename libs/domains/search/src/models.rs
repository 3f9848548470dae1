use domain_posts::SearchFilter;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A single search result: a post id with its similarity score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchHit {
    pub post_id: i64,
    /// Cosine similarity in `[0, 1]` for semantic search, blended score
    /// for hybrid search.
    pub similarity_score: f32,
}

/// Result of a search before it is wrapped into an HTTP response.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchOutcome {
    pub results: Vec<SearchHit>,
    pub total_found: usize,
}

/// Result of an indexing run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexOutcome {
    pub posts_indexed: usize,
    pub total_posts: usize,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EmbeddingRequest {
    /// Texts to embed, in request order.
    #[validate(length(min = 1, message = "texts must not be empty"))]
    pub texts: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmbeddingResponse {
    /// One normalized vector per input text, in request order.
    pub embeddings: Vec<Vec<f32>>,
    pub dimension: usize,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct IndexUpdateRequest {
    /// Restrict indexing to these posts. Ignored when `force_rebuild` is set.
    pub post_ids: Option<Vec<i64>>,

    /// Rebuild the whole index in the background instead of updating in place.
    #[serde(default)]
    pub force_rebuild: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IndexUpdateResponse {
    pub success: bool,
    pub message: String,
    pub posts_indexed: usize,
    pub total_posts: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IndexStatsResponse {
    /// Number of posts currently in the vector index.
    pub total_posts: usize,
    pub index_dimension: usize,
    pub model_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SearchRequest {
    #[validate(length(min = 1, max = 1000, message = "query must be 1-1000 characters"))]
    pub query: String,

    /// Maximum results to return. Clamped to `1..=100`.
    pub limit: Option<usize>,

    pub team_id: Option<i64>,
    pub author_id: Option<i64>,

    /// Minimum similarity score. Results below it are dropped.
    #[validate(range(min = 0.0, max = 1.0, message = "similarity_threshold must be in [0, 1]"))]
    pub similarity_threshold: Option<f32>,
}

impl SearchRequest {
    /// Result limit after applying the service default and clamping.
    pub fn effective_limit(&self, default: usize) -> usize {
        self.limit.unwrap_or(default).clamp(1, 100)
    }

    pub fn filter(&self) -> SearchFilter {
        SearchFilter {
            team_id: self.team_id,
            author_id: self.author_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub total_found: usize,
    /// Wall-clock search duration in seconds.
    pub search_time: f64,
}
