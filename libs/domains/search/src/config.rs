use std::path::PathBuf;

use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or_default};

/// Embedding model and search tuning configuration.
///
/// Environment variables:
/// - `MODEL_NAME` - sentence embedding model identifier
/// - `EMBEDDING_DIMENSION` - expected embedding dimensionality
/// - `SIMILARITY_THRESHOLD` - default minimum similarity score
/// - `SEARCH_RESULTS_LIMIT` - default result count when a request omits `limit`
/// - `INDEX_BATCH_SIZE` - posts embedded per batch during indexing
#[derive(Clone, Debug)]
pub struct MlConfig {
    pub model_name: String,
    pub dimension: usize,
    pub similarity_threshold: f32,
    pub results_limit: usize,
    pub batch_size: usize,
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            model_name: "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2".to_string(),
            dimension: 384,
            similarity_threshold: 0.7,
            results_limit: 20,
            batch_size: 100,
        }
    }
}

impl FromEnv for MlConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            model_name: env_or_default("MODEL_NAME", &defaults.model_name),
            dimension: env_parse_or_default("EMBEDDING_DIMENSION", defaults.dimension)?,
            similarity_threshold: env_parse_or_default(
                "SIMILARITY_THRESHOLD",
                defaults.similarity_threshold,
            )?,
            results_limit: env_parse_or_default("SEARCH_RESULTS_LIMIT", defaults.results_limit)?,
            batch_size: env_parse_or_default("INDEX_BATCH_SIZE", defaults.batch_size)?,
        })
    }
}

/// Vector index persistence configuration.
///
/// Environment variables:
/// - `VECTOR_DB_PATH` - directory holding index snapshots
/// - `INDEX_NAME` - snapshot file stem
#[derive(Clone, Debug)]
pub struct IndexConfig {
    pub storage_path: PathBuf,
    pub index_name: String,
}

impl IndexConfig {
    /// Full path of the on-disk index snapshot.
    pub fn container_path(&self) -> PathBuf {
        self.storage_path.join(format!("{}.bin", self.index_name))
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("./data/vector_db"),
            index_name: "posts_index".to_string(),
        }
    }
}

impl FromEnv for IndexConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            storage_path: PathBuf::from(env_or_default(
                "VECTOR_DB_PATH",
                &defaults.storage_path.to_string_lossy(),
            )),
            index_name: env_or_default("INDEX_NAME", &defaults.index_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ml_config_defaults() {
        let config = MlConfig::default();
        assert_eq!(
            config.model_name,
            "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2"
        );
        assert_eq!(config.dimension, 384);
        assert_eq!(config.results_limit, 20);
        assert_eq!(config.batch_size, 100);
    }

    #[test]
    fn test_ml_config_from_env_overrides() {
        temp_env::with_vars(
            [
                ("MODEL_NAME", Some("BAAI/bge-small-en-v1.5")),
                ("EMBEDDING_DIMENSION", Some("384")),
                ("SEARCH_RESULTS_LIMIT", Some("5")),
            ],
            || {
                let config = MlConfig::from_env().unwrap();
                assert_eq!(config.model_name, "BAAI/bge-small-en-v1.5");
                assert_eq!(config.results_limit, 5);
            },
        );
    }

    #[test]
    fn test_ml_config_from_env_invalid_dimension() {
        temp_env::with_var("EMBEDDING_DIMENSION", Some("not-a-number"), || {
            let result = MlConfig::from_env();
            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("EMBEDDING_DIMENSION"));
        });
    }

    #[test]
    fn test_index_config_container_path() {
        temp_env::with_vars(
            [
                ("VECTOR_DB_PATH", Some("/tmp/vectors")),
                ("INDEX_NAME", Some("posts_index")),
            ],
            || {
                let config = IndexConfig::from_env().unwrap();
                assert_eq!(
                    config.container_path(),
                    PathBuf::from("/tmp/vectors/posts_index.bin")
                );
            },
        );
    }
}
