use async_trait::async_trait;

use crate::error::PostResult;
use crate::models::{Post, SearchFilter};

/// Read-side access to the post corpus.
///
/// The search domain depends on this trait rather than on SeaORM directly,
/// which keeps services testable with a mocked repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Fetch posts eligible for indexing: not soft-deleted and public.
    ///
    /// When `post_ids` is `Some`, restricts the result to those ids;
    /// otherwise returns the full eligible corpus, ordered by id.
    async fn find_eligible(&self, post_ids: Option<Vec<i64>>) -> PostResult<Vec<Post>>;

    /// Narrow a candidate id set down to the posts visible under `filter`.
    async fn find_visible_ids(
        &self,
        post_ids: &[i64],
        filter: &SearchFilter,
    ) -> PostResult<Vec<i64>>;

    /// Ids of eligible posts whose title or content matches `query`
    /// case-insensitively, under `filter`.
    async fn keyword_search_ids(
        &self,
        query: &str,
        filter: &SearchFilter,
    ) -> PostResult<Vec<i64>>;

    /// Number of posts currently eligible for indexing.
    async fn count_eligible(&self) -> PostResult<u64>;
}
