//! Domain types shared by the loader, the assembler and the publisher.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The part of `<scope_id>.json` this tool reads.
///
/// Scope files carry many more keys (umap/cluster ids, labels, ...); they are
/// ignored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeMeta {
    pub embedding_id: String,
    pub embedding: EmbeddingInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingInfo {
    pub model_id: String,
}

impl ScopeMeta {
    pub fn model_name(&self) -> String {
        model_name(&self.embedding.model_id)
    }
}

/// One invocation: which scope to publish and under which metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRequest {
    pub directory: String,
    pub dataset: String,
    pub scope_id: String,
    pub metric: String,
}

impl ScopeRequest {
    pub fn table_name(&self) -> String {
        table_name(&self.scope_id, &self.metric)
    }
}

/// Derived vector table name, `scope_id` and `metric` joined verbatim.
pub fn table_name(scope_id: &str, metric: &str) -> String {
    format!("{scope_id}_{metric}")
}

/// Human-readable model name from a stored model id.
///
/// Model ids carry a two character provider prefix (e.g. `🤗-`) and encode
/// `/` as `___`, so `🤗-BAAI___bge-small-en-v1.5` becomes
/// `BAAI/bge-small-en-v1.5`.
pub fn model_name(model_id: &str) -> String {
    let stripped: String = model_id.chars().skip(2).collect();
    stripped.replace("___", "/")
}

/// Dense row-major `rows x dim` matrix of embedding vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    rows: usize,
    dim: usize,
    values: Vec<f32>,
}

impl EmbeddingMatrix {
    pub fn new(rows: usize, dim: usize, values: Vec<f32>) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidEmbeddings("vector dimension is 0".to_string()));
        }
        if values.len() != rows * dim {
            return Err(Error::InvalidEmbeddings(format!(
                "expected {} values for a {rows}x{dim} matrix, got {}",
                rows * dim,
                values.len()
            )));
        }
        Ok(Self { rows, dim, values })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Contiguous values for rows `start..start + len`.
    pub fn rows_slice(&self, start: usize, len: usize) -> &[f32] {
        &self.values[start * self.dim..(start + len) * self.dim]
    }
}
