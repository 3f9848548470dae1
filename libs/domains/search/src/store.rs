use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{SearchError, SearchResult};
use crate::index::VectorIndex;
use crate::models::SearchHit;

/// On-disk snapshot format for the vector index.
#[derive(Serialize, Deserialize)]
struct IndexContainer {
    dimension: u32,
    post_ids: Vec<i64>,
    vectors: Vec<f32>,
}

/// Thread-safe vector index with single-file persistence.
///
/// Every mutation rewrites the snapshot atomically: the container is
/// serialized to a temp file next to the target and renamed over it, so
/// a crash mid-write never leaves a truncated snapshot behind.
#[derive(Debug)]
pub struct VectorStore {
    path: PathBuf,
    dimension: usize,
    index: RwLock<VectorIndex>,
}

impl VectorStore {
    /// Open the store at `path`, loading an existing snapshot if present.
    pub fn open(path: impl Into<PathBuf>, dimension: usize) -> SearchResult<Self> {
        let path = path.into();

        let index = if path.exists() {
            let index = load_container(&path, dimension)?;
            info!(path = %path.display(), posts = index.len(), "Loaded vector index snapshot");
            index
        } else {
            info!(path = %path.display(), "No index snapshot found, starting empty");
            VectorIndex::new(dimension)
        };

        Ok(Self {
            path,
            dimension,
            index: RwLock::new(index),
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add vectors and persist the updated snapshot.
    pub fn add(&self, post_ids: &[i64], vectors: &[Vec<f32>]) -> SearchResult<()> {
        let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
        index.add(post_ids, vectors)?;
        persist(&self.path, &index)
    }

    /// Drop every vector and persist the empty snapshot.
    pub fn clear_and_persist(&self) -> SearchResult<()> {
        let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
        index.clear();
        persist(&self.path, &index)
    }

    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        min_score: Option<f32>,
    ) -> SearchResult<Vec<SearchHit>> {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .search(query, k, min_score)
    }
}

fn load_container(path: &Path, dimension: usize) -> SearchResult<VectorIndex> {
    let bytes = fs::read(path)
        .map_err(|e| SearchError::Index(format!("failed to read {}: {}", path.display(), e)))?;

    let container: IndexContainer = bincode::deserialize(&bytes)
        .map_err(|e| SearchError::Index(format!("failed to decode {}: {}", path.display(), e)))?;

    if container.dimension as usize != dimension {
        warn!(
            snapshot = container.dimension,
            configured = dimension,
            "Index snapshot dimension mismatch"
        );
        return Err(SearchError::Index(format!(
            "snapshot dimension {} does not match configured dimension {}",
            container.dimension, dimension
        )));
    }

    VectorIndex::from_parts(dimension, container.post_ids, container.vectors)
}

fn persist(path: &Path, index: &VectorIndex) -> SearchResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            SearchError::Index(format!("failed to create {}: {}", parent.display(), e))
        })?;
    }

    let container = IndexContainer {
        dimension: index.dimension() as u32,
        post_ids: index.post_ids().to_vec(),
        vectors: index.vectors().to_vec(),
    };

    let bytes = bincode::serialize(&container)
        .map_err(|e| SearchError::Index(format!("failed to encode index: {}", e)))?;

    let tmp_path = path.with_extension("bin.tmp");
    fs::write(&tmp_path, &bytes).map_err(|e| {
        SearchError::Index(format!("failed to write {}: {}", tmp_path.display(), e))
    })?;
    fs::rename(&tmp_path, path).map_err(|e| {
        SearchError::Index(format!("failed to replace {}: {}", path.display(), e))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open(dir.path().join("posts_index.bin"), 3).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.dimension(), 3);
    }

    #[test]
    fn test_add_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts_index.bin");

        let store = VectorStore::open(&path, 2).unwrap();
        store
            .add(&[1, 2], &[vec![1.0, 0.0], vec![0.0, 1.0]])
            .unwrap();
        drop(store);

        let reloaded = VectorStore::open(&path, 2).unwrap();
        assert_eq!(reloaded.len(), 2);

        let hits = reloaded.search(&[1.0, 0.0], 1, None).unwrap();
        assert_eq!(hits[0].post_id, 1);
    }

    #[test]
    fn test_open_rejects_dimension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts_index.bin");

        let store = VectorStore::open(&path, 2).unwrap();
        store.add(&[1], &[vec![1.0, 0.0]]).unwrap();
        drop(store);

        let err = VectorStore::open(&path, 384).unwrap_err();
        assert!(matches!(err, SearchError::Index(_)));
    }

    #[test]
    fn test_clear_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts_index.bin");

        let store = VectorStore::open(&path, 2).unwrap();
        store.add(&[1], &[vec![1.0, 0.0]]).unwrap();
        store.clear_and_persist().unwrap();
        drop(store);

        let reloaded = VectorStore::open(&path, 2).unwrap();
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_open_rejects_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts_index.bin");
        fs::write(&path, b"not a snapshot").unwrap();

        let err = VectorStore::open(&path, 2).unwrap_err();
        assert!(matches!(err, SearchError::Index(_)));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts_index.bin");

        let store = VectorStore::open(&path, 2).unwrap();
        store.add(&[1], &[vec![1.0, 0.0]]).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("bin.tmp").exists());
    }
}
