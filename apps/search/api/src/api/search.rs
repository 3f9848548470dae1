use axum::Router;
use domain_search::handlers::{SearchState, search_router};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    search_router(SearchState {
        service: state.search.clone(),
        default_limit: state.config.ml.results_limit,
    })
}
