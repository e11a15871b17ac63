use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{} is not a valid directory", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("projection has {projection_rows} rows but the embedding store has {embedding_rows}")]
    EmbeddingMismatch { projection_rows: usize, embedding_rows: usize },

    #[error("Invalid embeddings: {0}")]
    InvalidEmbeddings(String),

    #[error("Unsupported metric '{0}' (expected one of: l2, euclidean, cosine, dot, hamming)")]
    UnsupportedMetric(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
