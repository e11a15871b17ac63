//! The JSON sidecar describing a published vector table.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::paths::ScopePaths;
use crate::types::{ScopeMeta, ScopeRequest};

/// Field order is the on-disk key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanceMetadata {
    pub directory: String,
    pub scope_id: String,
    pub dataset: String,
    pub metric: String,
    pub db_uri: String,
    pub table_name: String,
    pub embedding_id: String,
    pub model_name: String,
}

impl LanceMetadata {
    pub fn new(request: &ScopeRequest, paths: &ScopePaths, scope: &ScopeMeta) -> Self {
        Self {
            directory: paths.directory().to_string_lossy().to_string(),
            scope_id: request.scope_id.clone(),
            dataset: request.dataset.clone(),
            metric: request.metric.clone(),
            db_uri: paths.db_uri(),
            table_name: request.table_name(),
            embedding_id: scope.embedding_id.clone(),
            model_name: scope.model_name(),
        }
    }
}

pub fn sidecar_path(output_dir: &Path, table_name: &str) -> PathBuf {
    output_dir.join(format!("{table_name}.json"))
}

/// Write `<output_dir>/<table_name>.json`, replacing any previous file.
pub fn write_sidecar(output_dir: &Path, metadata: &LanceMetadata) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;
    let path = sidecar_path(output_dir, &metadata.table_name);
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    metadata.serialize(&mut ser)?;
    fs::write(&path, buf).with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "sidecar written");
    Ok(path)
}

pub fn read_sidecar(path: &Path) -> anyhow::Result<LanceMetadata> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
