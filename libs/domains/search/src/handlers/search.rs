use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use axum_helpers::ValidatedJson;
use domain_posts::PostRepository;
use tracing::instrument;
use utoipa::OpenApi;

use crate::embedder::TextEmbedder;
use crate::error::SearchError;
use crate::models::{SearchHit, SearchRequest, SearchResponse};
use crate::service::SearchService;

/// Shared state for the search endpoints.
pub struct SearchState<R, E> {
    pub service: Arc<SearchService<R, E>>,
    /// Result limit applied when a request omits `limit`.
    pub default_limit: usize,
}

impl<R, E> Clone for SearchState<R, E> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            default_limit: self.default_limit,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(semantic, hybrid),
    components(schemas(SearchRequest, SearchResponse, SearchHit)),
    tags((name = "search", description = "Semantic and hybrid search over posts"))
)]
pub struct SearchApiDoc;

pub fn search_router<R, E>(state: SearchState<R, E>) -> Router
where
    R: PostRepository + 'static,
    E: TextEmbedder + 'static,
{
    Router::new()
        .route("/semantic", post(semantic::<R, E>))
        .route("/hybrid", post(hybrid::<R, E>))
        .with_state(state)
}

/// Rank posts by embedding similarity to the query.
#[utoipa::path(
    post,
    path = "/semantic",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Search results", body = SearchResponse),
        (status = 400, description = "Invalid query"),
        (status = 503, description = "Embedding model unavailable")
    ),
    tag = "search"
)]
#[instrument(skip(state, request))]
async fn semantic<R, E>(
    State(state): State<SearchState<R, E>>,
    ValidatedJson(request): ValidatedJson<SearchRequest>,
) -> Result<Json<SearchResponse>, SearchError>
where
    R: PostRepository + 'static,
    E: TextEmbedder + 'static,
{
    let started = Instant::now();
    let outcome = state
        .service
        .semantic(
            &request.query,
            request.effective_limit(state.default_limit),
            &request.filter(),
            request.similarity_threshold,
        )
        .await?;

    Ok(Json(SearchResponse {
        query: request.query,
        results: outcome.results,
        total_found: outcome.total_found,
        search_time: started.elapsed().as_secs_f64(),
    }))
}

/// Rank posts by a blend of embedding similarity and keyword matching.
#[utoipa::path(
    post,
    path = "/hybrid",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Search results", body = SearchResponse),
        (status = 400, description = "Invalid query"),
        (status = 503, description = "Embedding model unavailable")
    ),
    tag = "search"
)]
#[instrument(skip(state, request))]
async fn hybrid<R, E>(
    State(state): State<SearchState<R, E>>,
    ValidatedJson(request): ValidatedJson<SearchRequest>,
) -> Result<Json<SearchResponse>, SearchError>
where
    R: PostRepository + 'static,
    E: TextEmbedder + 'static,
{
    let started = Instant::now();
    let outcome = state
        .service
        .hybrid(
            &request.query,
            request.effective_limit(state.default_limit),
            &request.filter(),
            request.similarity_threshold,
        )
        .await?;

    Ok(Json(SearchResponse {
        query: request.query,
        results: outcome.results,
        total_found: outcome.total_found,
        search_time: started.elapsed().as_secs_f64(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::VectorStore;
    use crate::testing::{MockPosts, StubEmbedder};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_app(repo: MockPosts) -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(VectorStore::open(dir.path().join("index.bin"), 4).unwrap());
        store
            .add(
                &[1, 2],
                &[
                    vec![1.0, 0.0, 0.0, 0.0],
                    vec![0.0, 1.0, 0.0, 0.0],
                ],
            )
            .unwrap();

        let service = Arc::new(SearchService::new(
            Arc::new(repo),
            Arc::new(StubEmbedder::new(4)),
            store,
        ));
        let app = search_router(SearchState {
            service,
            default_limit: 20,
        });
        (dir, app)
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_semantic_endpoint_returns_ranked_results() {
        let mut repo = MockPosts::new();
        repo.expect_find_visible_ids()
            .returning(|ids, _| Ok(ids.to_vec()));

        let (_dir, app) = test_app(repo);
        let response = app
            .oneshot(json_request("/semantic", r#"{"query": "abcd"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["query"], "abcd");
        assert_eq!(body["total_found"], 2);
        assert_eq!(body["results"][0]["post_id"], 1);
        assert!(body["search_time"].as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn test_semantic_endpoint_rejects_empty_query() {
        let (_dir, app) = test_app(MockPosts::new());
        let response = app
            .oneshot(json_request("/semantic", r#"{"query": ""}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_hybrid_endpoint_includes_keyword_matches() {
        let mut repo = MockPosts::new();
        repo.expect_find_visible_ids()
            .returning(|ids, _| Ok(ids.to_vec()));
        repo.expect_keyword_search_ids()
            .returning(|_, _| Ok(vec![3]));

        let (_dir, app) = test_app(repo);
        let response = app
            .oneshot(json_request(
                "/hybrid",
                r#"{"query": "abcd", "similarity_threshold": 0.5}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let results = body["results"].as_array().unwrap();
        assert!(results.iter().any(|hit| hit["post_id"] == 3));
    }

    #[tokio::test]
    async fn test_semantic_endpoint_passes_filters() {
        let mut repo = MockPosts::new();
        repo.expect_find_visible_ids()
            .withf(|_, filter| filter.team_id == Some(7) && filter.author_id == Some(3))
            .returning(|_, _| Ok(vec![]));

        let (_dir, app) = test_app(repo);
        let response = app
            .oneshot(json_request(
                "/semantic",
                r#"{"query": "abcd", "team_id": 7, "author_id": 3}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["total_found"], 0);
    }
}
