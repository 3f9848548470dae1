//! Shared test doubles for the search domain.

use async_trait::async_trait;
use domain_posts::{Post, PostRepository, PostResult, PostStatus, SearchFilter};

use crate::embedder::TextEmbedder;
use crate::error::SearchResult;

mockall::mock! {
    pub Posts {}

    #[async_trait]
    impl PostRepository for Posts {
        async fn find_eligible(&self, post_ids: Option<Vec<i64>>) -> PostResult<Vec<Post>>;
        async fn find_visible_ids(
            &self,
            post_ids: &[i64],
            filter: &SearchFilter,
        ) -> PostResult<Vec<i64>>;
        async fn keyword_search_ids(
            &self,
            query: &str,
            filter: &SearchFilter,
        ) -> PostResult<Vec<i64>>;
        async fn count_eligible(&self) -> PostResult<u64>;
    }
}

/// Deterministic embedder: each text maps to a unit vector whose axis is
/// derived from the text length, so equal texts embed identically.
pub struct StubEmbedder {
    dimension: usize,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl TextEmbedder for StubEmbedder {
    fn embed(&self, texts: &[String]) -> SearchResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0; self.dimension];
                vector[text.len() % self.dimension] = 1.0;
                vector
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "stub-embedder"
    }
}

pub fn sample_post(id: i64, title: &str) -> Post {
    Post {
        id,
        title: title.to_string(),
        content: format!("content of {}", title),
        status: PostStatus::Public,
        team_id: None,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}
