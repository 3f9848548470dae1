//! Shared application state passed to request handlers.

use std::sync::Arc;

use domain_posts::PgPostRepository;
use domain_search::{
    FastTextEmbedder, IndexService, RebuildTracker, SearchService, VectorStore,
};

/// Cloned per handler; everything inside is an Arc or otherwise cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: database::postgres::DatabaseConnection,
    /// Redis connection manager
    pub redis: database::redis::ConnectionManager,
    pub embedder: Arc<FastTextEmbedder>,
    pub store: Arc<VectorStore>,
    pub indexer: Arc<IndexService<PgPostRepository, FastTextEmbedder>>,
    pub search: Arc<SearchService<PgPostRepository, FastTextEmbedder>>,
    pub tracker: RebuildTracker,
}
