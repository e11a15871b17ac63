//! HDF5-backed embedding store (`embeddings/<embedding_id>.h5`).
//!
//! The file holds a single 2-D dataset named `embeddings`, one row per item
//! of the dataset. Any float or integer element type is read as f32.
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use scopelance_core::error::Error;
use scopelance_core::traits::EmbeddingStore;
use scopelance_core::types::EmbeddingMatrix;

pub const EMBEDDINGS_DATASET: &str = "embeddings";

pub struct Hdf5EmbeddingStore {
    path: PathBuf,
    file: hdf5::File,
}

impl Hdf5EmbeddingStore {
    pub fn open(path: &Path) -> Result<Self> {
        let file = hdf5::File::open(path)
            .with_context(|| format!("opening embedding store {}", path.display()))?;
        Ok(Self { path: path.to_path_buf(), file })
    }

    fn dataset(&self) -> Result<hdf5::Dataset> {
        if !self.file.link_exists(EMBEDDINGS_DATASET) {
            let what = format!("dataset '{}' in {}", EMBEDDINGS_DATASET, self.path.display());
            return Err(Error::NotFound(what).into());
        }
        Ok(self.file.dataset(EMBEDDINGS_DATASET)?)
    }
}

impl EmbeddingStore for Hdf5EmbeddingStore {
    fn shape(&self) -> Result<(usize, usize)> {
        let shape = self.dataset()?.shape();
        match shape.as_slice() {
            [rows, dim] => Ok((*rows, *dim)),
            other => Err(Error::InvalidEmbeddings(format!(
                "{} has shape {:?}, expected a 2-D array",
                self.path.display(),
                other
            ))
            .into()),
        }
    }

    fn read_matrix(&self) -> Result<EmbeddingMatrix> {
        let (rows, dim) = self.shape()?;
        let values: Vec<f32> = self
            .dataset()?
            .read_raw::<f32>()
            .with_context(|| {
                format!("reading {} from {}", EMBEDDINGS_DATASET, self.path.display())
            })?;
        Ok(EmbeddingMatrix::new(rows, dim, values)?)
    }
}

/// Write `matrix` as a `rows x dim` f32 `embeddings` dataset (test fixtures).
pub fn write_embeddings(path: &Path, matrix: &EmbeddingMatrix) -> Result<()> {
    let file = hdf5::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let ds = file
        .new_dataset::<f32>()
        .shape((matrix.rows(), matrix.dim()))
        .create(EMBEDDINGS_DATASET)?;
    ds.write_raw(matrix.rows_slice(0, matrix.rows()))?;
    Ok(())
}
