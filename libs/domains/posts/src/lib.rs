//! Post catalog domain.
//!
//! Read-side access to the post corpus used by semantic search: entity
//! definitions, the repository trait, and its Postgres implementation.

pub mod entity;
pub mod error;
pub mod models;
pub mod postgres;
pub mod repository;

pub use error::{PostError, PostResult};
pub use models::{EditorRole, Post, PostStatus, SearchFilter};
pub use postgres::PgPostRepository;
pub use repository::PostRepository;
