use std::sync::Arc;

use domain_posts::{Post, PostRepository};
use tracing::{info, instrument};

use crate::embedder::TextEmbedder;
use crate::error::{SearchError, SearchResult};
use crate::models::IndexOutcome;
use crate::store::VectorStore;

/// Maintains the vector index from the post corpus.
pub struct IndexService<R, E> {
    repository: Arc<R>,
    embedder: Arc<E>,
    store: Arc<VectorStore>,
    batch_size: usize,
}

impl<R, E> IndexService<R, E>
where
    R: PostRepository,
    E: TextEmbedder + 'static,
{
    pub fn new(
        repository: Arc<R>,
        embedder: Arc<E>,
        store: Arc<VectorStore>,
        batch_size: usize,
    ) -> Self {
        Self {
            repository,
            embedder,
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Embed and index eligible posts, all of them or just `post_ids`.
    #[instrument(skip(self), fields(restricted = post_ids.is_some()))]
    pub async fn index_posts(&self, post_ids: Option<Vec<i64>>) -> SearchResult<IndexOutcome> {
        let posts = self.repository.find_eligible(post_ids).await?;
        let posts_indexed = self.index_batches(posts).await?;

        let outcome = IndexOutcome {
            posts_indexed,
            total_posts: self.store.len(),
        };
        info!(
            posts_indexed = outcome.posts_indexed,
            total_posts = outcome.total_posts,
            "Indexing run completed"
        );
        Ok(outcome)
    }

    /// Drop the whole index and re-embed the full eligible corpus.
    #[instrument(skip(self))]
    pub async fn rebuild(&self) -> SearchResult<IndexOutcome> {
        info!("Rebuilding vector index from scratch");
        self.store.clear_and_persist()?;
        self.index_posts(None).await
    }

    async fn index_batches(&self, posts: Vec<Post>) -> SearchResult<usize> {
        let mut indexed = 0;

        for batch in posts.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(Post::embedding_text).collect();
            let ids: Vec<i64> = batch.iter().map(|post| post.id).collect();

            // Model inference is CPU-bound; keep it off the async workers.
            let embedder = self.embedder.clone();
            let vectors = tokio::task::spawn_blocking(move || embedder.embed(&texts))
                .await
                .map_err(|e| SearchError::Embedding(format!("embedding task failed: {}", e)))??;
            self.store.add(&ids, &vectors)?;

            indexed += batch.len();
            info!(indexed, total = posts.len(), "Indexed batch");
        }

        Ok(indexed)
    }
}
