use crate::types::EmbeddingMatrix;

/// Source of the per-row embedding vectors of a scope.
///
/// Row `i` of the store belongs to row `i` of the scope's projection; there
/// is no key to join on.
pub trait EmbeddingStore {
    /// `(rows, dim)` without reading the values.
    fn shape(&self) -> anyhow::Result<(usize, usize)>;
    fn read_matrix(&self) -> anyhow::Result<EmbeddingMatrix>;
}

impl EmbeddingStore for EmbeddingMatrix {
    fn shape(&self) -> anyhow::Result<(usize, usize)> {
        Ok((self.rows(), self.dim()))
    }

    fn read_matrix(&self) -> anyhow::Result<EmbeddingMatrix> {
        Ok(self.clone())
    }
}
