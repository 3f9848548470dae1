use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_helpers::ValidatedJson;
use domain_posts::PostRepository;
use tracing::{error, info, instrument};
use utoipa::OpenApi;

use crate::embedder::TextEmbedder;
use crate::error::SearchError;
use crate::indexer::IndexService;
use crate::models::{
    EmbeddingRequest, EmbeddingResponse, IndexStatsResponse, IndexUpdateRequest,
    IndexUpdateResponse,
};
use crate::rebuild::{RebuildSnapshot, RebuildStatus, RebuildTracker};
use crate::store::VectorStore;

/// Shared state for the embeddings endpoints.
pub struct EmbeddingsState<R, E> {
    pub embedder: Arc<E>,
    pub store: Arc<VectorStore>,
    pub indexer: Arc<IndexService<R, E>>,
    pub tracker: RebuildTracker,
}

impl<R, E> Clone for EmbeddingsState<R, E> {
    fn clone(&self) -> Self {
        Self {
            embedder: self.embedder.clone(),
            store: self.store.clone(),
            indexer: self.indexer.clone(),
            tracker: self.tracker.clone(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(generate, update_index, index_stats, rebuild_status),
    components(schemas(
        EmbeddingRequest,
        EmbeddingResponse,
        IndexUpdateRequest,
        IndexUpdateResponse,
        IndexStatsResponse,
        RebuildSnapshot,
        RebuildStatus,
    )),
    tags((name = "embeddings", description = "Embedding generation and index maintenance"))
)]
pub struct EmbeddingsApiDoc;

pub fn embeddings_router<R, E>(state: EmbeddingsState<R, E>) -> Router
where
    R: PostRepository + 'static,
    E: TextEmbedder + 'static,
{
    Router::new()
        .route("/generate", post(generate::<R, E>))
        .route("/update-index", post(update_index::<R, E>))
        .route("/index-stats", get(index_stats::<R, E>))
        .route("/rebuild-status", get(rebuild_status::<R, E>))
        .with_state(state)
}

/// Embed arbitrary texts without touching the index.
#[utoipa::path(
    post,
    path = "/generate",
    request_body = EmbeddingRequest,
    responses(
        (status = 200, description = "Embeddings generated", body = EmbeddingResponse),
        (status = 400, description = "Empty text list"),
        (status = 503, description = "Embedding model unavailable")
    ),
    tag = "embeddings"
)]
#[instrument(skip(state, request), fields(texts = request.texts.len()))]
async fn generate<R, E>(
    State(state): State<EmbeddingsState<R, E>>,
    ValidatedJson(request): ValidatedJson<EmbeddingRequest>,
) -> Result<Json<EmbeddingResponse>, SearchError>
where
    R: PostRepository + 'static,
    E: TextEmbedder + 'static,
{
    // Model inference is CPU-bound; keep it off the async workers.
    let embedder = state.embedder.clone();
    let texts = request.texts;
    let embeddings = tokio::task::spawn_blocking(move || embedder.embed(&texts))
        .await
        .map_err(|e| SearchError::Embedding(format!("embedding task failed: {}", e)))??;

    Ok(Json(EmbeddingResponse {
        embeddings,
        dimension: state.embedder.dimension(),
    }))
}

/// Update the vector index in place, or kick off a background rebuild.
///
/// A rebuild request returns immediately; progress is exposed by
/// `GET /rebuild-status`. A second rebuild request while one is running
/// is refused.
#[utoipa::path(
    post,
    path = "/update-index",
    request_body = IndexUpdateRequest,
    responses(
        (status = 200, description = "Index updated or rebuild started", body = IndexUpdateResponse),
        (status = 503, description = "Embedding model unavailable")
    ),
    tag = "embeddings"
)]
#[instrument(skip(state, request), fields(force_rebuild = request.force_rebuild))]
async fn update_index<R, E>(
    State(state): State<EmbeddingsState<R, E>>,
    ValidatedJson(request): ValidatedJson<IndexUpdateRequest>,
) -> Result<Json<IndexUpdateResponse>, SearchError>
where
    R: PostRepository + 'static,
    E: TextEmbedder + 'static,
{
    if request.force_rebuild {
        if !state.tracker.try_start() {
            return Ok(Json(IndexUpdateResponse {
                success: false,
                message: "Index rebuild already in progress".to_string(),
                posts_indexed: 0,
                total_posts: 0,
            }));
        }

        let indexer = state.indexer.clone();
        let tracker = state.tracker.clone();
        tokio::spawn(async move {
            match indexer.rebuild().await {
                Ok(outcome) => {
                    info!(posts_indexed = outcome.posts_indexed, "Index rebuild finished");
                    tracker.finish(outcome.posts_indexed);
                }
                Err(e) => {
                    error!(error = %e, "Index rebuild failed");
                    tracker.fail(e.to_string());
                }
            }
        });

        return Ok(Json(IndexUpdateResponse {
            success: true,
            message: "Index rebuild started".to_string(),
            posts_indexed: 0,
            total_posts: 0,
        }));
    }

    let outcome = state.indexer.index_posts(request.post_ids).await?;

    Ok(Json(IndexUpdateResponse {
        success: true,
        message: "Index updated successfully".to_string(),
        posts_indexed: outcome.posts_indexed,
        total_posts: outcome.total_posts,
    }))
}

/// Current size and configuration of the vector index.
#[utoipa::path(
    get,
    path = "/index-stats",
    responses(
        (status = 200, description = "Index statistics", body = IndexStatsResponse)
    ),
    tag = "embeddings"
)]
async fn index_stats<R, E>(
    State(state): State<EmbeddingsState<R, E>>,
) -> Json<IndexStatsResponse>
where
    R: PostRepository + 'static,
    E: TextEmbedder + 'static,
{
    Json(IndexStatsResponse {
        total_posts: state.store.len(),
        index_dimension: state.store.dimension(),
        model_name: state.embedder.model_name().to_string(),
    })
}

/// Status of the most recent background rebuild.
#[utoipa::path(
    get,
    path = "/rebuild-status",
    responses(
        (status = 200, description = "Rebuild status", body = RebuildSnapshot)
    ),
    tag = "embeddings"
)]
async fn rebuild_status<R, E>(
    State(state): State<EmbeddingsState<R, E>>,
) -> Json<RebuildSnapshot>
where
    R: PostRepository + 'static,
    E: TextEmbedder + 'static,
{
    Json(state.tracker.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPosts, StubEmbedder, sample_post};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state(repo: MockPosts) -> (tempfile::TempDir, EmbeddingsState<MockPosts, StubEmbedder>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(VectorStore::open(dir.path().join("index.bin"), 4).unwrap());
        let embedder = Arc::new(StubEmbedder::new(4));
        let repository = Arc::new(repo);
        let indexer = Arc::new(IndexService::new(
            repository,
            embedder.clone(),
            store.clone(),
            100,
        ));

        let state = EmbeddingsState {
            embedder,
            store,
            indexer,
            tracker: RebuildTracker::new(),
        };
        (dir, state)
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
    async fn test_generate_returns_embeddings() {
        let (_dir, state) = test_state(MockPosts::new());
        let app = embeddings_router(state);

        let response = app
            .oneshot(json_request("/generate", r#"{"texts": ["hello", "world"]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["dimension"], 4);
        assert_eq!(body["embeddings"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_generate_handles_large_batches() {
        let (_dir, state) = test_state(MockPosts::new());
        let app = embeddings_router(state);

        let texts: Vec<String> = (0..64).map(|i| format!("post number {}", i)).collect();
        let payload = serde_json::json!({ "texts": texts }).to_string();

        let response = app.oneshot(json_request("/generate", &payload)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["embeddings"].as_array().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_texts() {
        let (_dir, state) = test_state(MockPosts::new());
        let app = embeddings_router(state);

        let response = app
            .oneshot(json_request("/generate", r#"{"texts": []}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_index_indexes_posts() {
        let mut repo = MockPosts::new();
        repo.expect_find_eligible()
            .returning(|_| Ok(vec![sample_post(1, "alpha")]));

        let (_dir, state) = test_state(repo);
        let app = embeddings_router(state);

        let response = app
            .oneshot(json_request("/update-index", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["posts_indexed"], 1);
        assert_eq!(body["total_posts"], 1);
    }

    #[tokio::test]
    async fn test_update_index_force_rebuild_returns_immediately() {
        let mut repo = MockPosts::new();
        repo.expect_find_eligible().returning(|_| Ok(vec![]));

        let (_dir, state) = test_state(repo);
        let app = embeddings_router(state);

        let response = app
            .oneshot(json_request("/update-index", r#"{"force_rebuild": true}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["posts_indexed"], 0);
        assert_eq!(body["message"], "Index rebuild started");
    }

    #[tokio::test]
    async fn test_update_index_refuses_concurrent_rebuild() {
        let mut repo = MockPosts::new();
        repo.expect_find_eligible().returning(|_| Ok(vec![]));

        let (_dir, state) = test_state(repo);
        assert!(state.tracker.try_start());
        let app = embeddings_router(state);

        let response = app
            .oneshot(json_request("/update-index", r#"{"force_rebuild": true}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Index rebuild already in progress");
    }

    #[tokio::test]
    async fn test_index_stats() {
        let (_dir, state) = test_state(MockPosts::new());
        state.store.add(&[1], &[vec![1.0, 0.0, 0.0, 0.0]]).unwrap();
        let app = embeddings_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/index-stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["total_posts"], 1);
        assert_eq!(body["index_dimension"], 4);
        assert_eq!(body["model_name"], "stub-embedder");
    }

    #[tokio::test]
    async fn test_rebuild_status_starts_idle() {
        let (_dir, state) = test_state(MockPosts::new());
        let app = embeddings_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/rebuild-status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "idle");
        assert_eq!(body["posts_indexed"], 0);
    }
}
