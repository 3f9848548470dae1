use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_posts::PostError;
use thiserror::Error;

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<PostError> for SearchError {
    fn from(err: PostError) -> Self {
        SearchError::Database(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::ModelUnavailable(msg) => AppError::ServiceUnavailable(msg),
            SearchError::Embedding(msg) => AppError::InternalServerError(msg),
            SearchError::Index(msg) => AppError::InternalServerError(msg),
            SearchError::Validation(msg) => AppError::BadRequest(msg),
            SearchError::Database(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
