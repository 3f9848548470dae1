//! Semantic search domain.
//!
//! Embedding generation, the in-memory vector index with on-disk
//! persistence, index maintenance, and the semantic/hybrid search
//! services plus their HTTP handlers.

pub mod config;
pub mod embedder;
pub mod error;
pub mod handlers;
pub mod index;
pub mod indexer;
pub mod models;
pub mod rebuild;
pub mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{IndexConfig, MlConfig};
pub use embedder::{FastTextEmbedder, TextEmbedder};
pub use error::{SearchError, SearchResult};
pub use index::VectorIndex;
pub use indexer::IndexService;
pub use models::{
    EmbeddingRequest, EmbeddingResponse, IndexOutcome, IndexStatsResponse, IndexUpdateRequest,
    IndexUpdateResponse, SearchHit, SearchOutcome, SearchRequest, SearchResponse,
};
pub use rebuild::{RebuildSnapshot, RebuildStatus, RebuildTracker};
pub use service::SearchService;
pub use store::VectorStore;
