//! SeaORM entities for the post catalog tables.

pub mod editor;
pub mod post;
