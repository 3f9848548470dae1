//! Application-specific health handlers with real dependency checks.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct ServiceHealth {
    pub status: &'static str,
    pub version: &'static str,
    pub models_loaded: bool,
    pub database_connected: bool,
    pub vector_index_size: usize,
}

/// Service health for the search API: model, database, and index state.
pub async fn service_health(State(state): State<AppState>) -> Json<ServiceHealth> {
    let database_connected = database::postgres::check_health(&state.db).await.is_ok();

    Json(ServiceHealth {
        status: if database_connected {
            "healthy"
        } else {
            "degraded"
        },
        version: state.config.app.version,
        // The embedder is constructed before the server starts accepting
        // traffic, so a running server always has its model loaded.
        models_loaded: true,
        database_connected,
        vector_index_size: state.store.len(),
    })
}

/// Readiness check that verifies database and redis connections.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "database",
            Box::pin(async {
                database::postgres::check_health(&state.db)
                    .await
                    .map_err(|e| e.to_string())
            }),
        ),
        (
            "redis",
            Box::pin(async {
                let mut redis = state.redis.clone();
                database::redis::check_health(&mut redis)
                    .await
                    .map_err(|e| e.to_string())
            }),
        ),
    ];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}
