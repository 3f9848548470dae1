//! HTTP handlers and routers for the search domain.

pub mod embeddings;
pub mod search;

pub use embeddings::{EmbeddingsApiDoc, EmbeddingsState, embeddings_router};
pub use search::{SearchApiDoc, SearchState, search_router};
