//! On-disk layout of a latent-scope dataset.
//!
//! ```text
//! <directory>/<dataset>/
//!     scopes/<scope_id>-input.parquet
//!     scopes/<scope_id>.json
//!     embeddings/<embedding_id>.h5
//!     lancedb/
//! ```
use std::path::{Path, PathBuf};

use crate::config::expand_path;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ScopePaths {
    directory: PathBuf,
    dataset_path: PathBuf,
    scope_id: String,
}

impl ScopePaths {
    pub fn new(directory: &str, dataset: &str, scope_id: &str) -> Self {
        let directory = expand_path(directory);
        let dataset_path = directory.join(dataset);
        Self { directory, dataset_path, scope_id: scope_id.to_string() }
    }

    /// Fails with `InvalidDirectory` unless the data directory exists.
    pub fn validate(&self) -> Result<()> {
        if self.directory.is_dir() {
            Ok(())
        } else {
            Err(Error::InvalidDirectory(self.directory.clone()))
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    pub fn scopes_dir(&self) -> PathBuf {
        self.dataset_path.join("scopes")
    }

    pub fn projection_path(&self) -> PathBuf {
        self.scopes_dir().join(format!("{}-input.parquet", self.scope_id))
    }

    pub fn scope_meta_path(&self) -> PathBuf {
        self.scopes_dir().join(format!("{}.json", self.scope_id))
    }

    pub fn embeddings_path(&self, embedding_id: &str) -> PathBuf {
        self.dataset_path.join("embeddings").join(format!("{embedding_id}.h5"))
    }

    pub fn db_path(&self) -> PathBuf {
        self.dataset_path.join("lancedb")
    }

    pub fn db_uri(&self) -> String {
        self.db_path().to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_under_dataset() {
        let p = ScopePaths::new("/data/ls", "squad", "scopes-001");
        assert_eq!(p.dataset_path(), Path::new("/data/ls/squad"));
        assert_eq!(p.projection_path(), PathBuf::from("/data/ls/squad/scopes/scopes-001-input.parquet"));
        assert_eq!(p.scope_meta_path(), PathBuf::from("/data/ls/squad/scopes/scopes-001.json"));
        assert_eq!(p.embeddings_path("embedding-001"), PathBuf::from("/data/ls/squad/embeddings/embedding-001.h5"));
        assert_eq!(p.db_uri(), "/data/ls/squad/lancedb");
    }

    #[test]
    fn validate_rejects_missing_directory() {
        let tmp = tempfile::tempdir().expect("tmp");
        let missing = tmp.path().join("nope");
        let p = ScopePaths::new(&missing.to_string_lossy(), "d", "s");
        assert!(matches!(p.validate(), Err(Error::InvalidDirectory(d)) if d == missing));
        let ok = ScopePaths::new(&tmp.path().to_string_lossy(), "d", "s");
        assert!(ok.validate().is_ok());
    }
}
