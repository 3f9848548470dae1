use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;

pub type PostResult<T> = Result<T, PostError>;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("Post not found: {0}")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DbErr> for PostError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(msg) => {
                PostError::Database(format!("record not found: {}", msg))
            }
            other => PostError::Database(other.to_string()),
        }
    }
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotFound(id) => AppError::NotFound(format!("Post {} not found", id)),
            PostError::Database(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for PostError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = PostError::NotFound(42).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_database_maps_to_500() {
        let response = PostError::Database("connection reset".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
