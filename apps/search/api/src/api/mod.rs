use axum::Router;
use axum::routing::get;

pub mod embeddings;
pub mod health;
pub mod search;

/// API routes without the `/api` prefix; `create_router` adds it.
///
/// Returns a stateless Router: every sub-router already has its state
/// applied, so only Arc clones happen per request.
pub fn routes(state: &crate::state::AppState) -> Router {
    let service_health = Router::new()
        .route("/health", get(health::service_health))
        .with_state(state.clone());

    Router::new()
        .nest("/embeddings", embeddings::router(state))
        .nest("/search", search::router(state))
        .merge(service_health)
}

/// Router for the `/ready` endpoint with real dependency checks.
pub fn ready_router(state: crate::state::AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
