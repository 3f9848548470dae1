use axum::Router;
use domain_search::handlers::{EmbeddingsState, embeddings_router};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    embeddings_router(EmbeddingsState {
        embedder: state.embedder.clone(),
        store: state.store.clone(),
        indexer: state.indexer.clone(),
        tracker: state.tracker.clone(),
    })
}
