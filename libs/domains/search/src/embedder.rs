use std::sync::{Mutex, PoisonError};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::info;

use crate::config::MlConfig;
use crate::error::{SearchError, SearchResult};

/// Produces normalized sentence embeddings.
///
/// Object-safe so services can be tested with a stub embedder.
pub trait TextEmbedder: Send + Sync {
    /// Embed `texts`, returning one vector per input in request order.
    fn embed(&self, texts: &[String]) -> SearchResult<Vec<Vec<f32>>>;

    /// Dimensionality of the vectors this embedder produces.
    fn dimension(&self) -> usize;

    /// Identifier of the underlying model.
    fn model_name(&self) -> &str;
}

/// [`TextEmbedder`] backed by a local fastembed ONNX model.
pub struct FastTextEmbedder {
    model: Mutex<TextEmbedding>,
    model_name: String,
    dimension: usize,
}

impl FastTextEmbedder {
    /// Load the model named by `config`, downloading it on first use.
    pub fn new(config: &MlConfig) -> SearchResult<Self> {
        let model_kind = model_from_name(&config.model_name)?;

        info!(model = %config.model_name, "Loading embedding model");
        let model = TextEmbedding::try_new(
            InitOptions::new(model_kind).with_show_download_progress(false),
        )
        .map_err(|e| SearchError::ModelUnavailable(e.to_string()))?;
        info!(model = %config.model_name, dimension = config.dimension, "Embedding model ready");

        Ok(Self {
            model: Mutex::new(model),
            model_name: config.model_name.clone(),
            dimension: config.dimension,
        })
    }
}

impl TextEmbedder for FastTextEmbedder {
    fn embed(&self, texts: &[String]) -> SearchResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut model = self
            .model
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let embeddings = model
            .embed(texts.to_vec(), None)
            .map_err(|e| SearchError::Embedding(e.to_string()))?;

        drop(model);

        embeddings
            .into_iter()
            .map(|vector| {
                if vector.len() != self.dimension {
                    return Err(SearchError::Embedding(format!(
                        "model returned {}-dimensional vector, expected {}",
                        vector.len(),
                        self.dimension
                    )));
                }
                Ok(normalize(vector))
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Map a sentence-transformers style model name onto a fastembed model.
fn model_from_name(name: &str) -> SearchResult<EmbeddingModel> {
    match name {
        "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2" => {
            Ok(EmbeddingModel::ParaphraseMLMiniLML12V2)
        }
        "sentence-transformers/all-MiniLM-L6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "BAAI/bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "intfloat/multilingual-e5-small" => Ok(EmbeddingModel::MultilingualE5Small),
        other => Err(SearchError::ModelUnavailable(format!(
            "unsupported embedding model: {}",
            other
        ))),
    }
}

/// Scale a vector to unit L2 norm so inner product equals cosine similarity.
fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}
