//! Publish a scope as a LanceDB vector table.
//!
//! Stages run strictly in order:
//! 1) validate the data directory and the metric (no writes yet)
//! 2) load scope metadata, projection and embeddings; attach vectors
//! 3) replace the `<scope_id>_<metric>` table and build its IVF_PQ index
//! 4) write the metadata sidecar
//!
//! Everything that can be rejected is rejected before step 3, so a bad input
//! leaves neither a `lancedb` directory nor a sidecar behind. A failure during
//! index build leaves the new table without an index.
use anyhow::Result;
use lancedb::DistanceType;
use std::path::{Path, PathBuf};
use tracing::info;

use scopelance_core::config::Settings;
use scopelance_core::metadata::{write_sidecar, LanceMetadata};
use scopelance_core::paths::ScopePaths;
use scopelance_core::traits::EmbeddingStore;
use scopelance_core::types::{ScopeMeta, ScopeRequest};

use crate::assemble::{attach_vectors, AssembledTable};
use crate::index_build::{build_ivfpq_index, compute_ivfpq_params, parse_metric, IvfPqParams};
use crate::scope::{load_projection, load_scope_meta};
use crate::table::{open_db, replace_table, ExistenceCheck};

#[derive(Debug, Clone)]
pub struct PublishReport {
    pub table_name: String,
    pub db_uri: String,
    pub rows: usize,
    pub dim: usize,
    pub index: Option<IvfPqParams>,
    pub metadata_path: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct PublishOptions {
    pub existence_check: ExistenceCheck,
    /// Skip IVF_PQ training, e.g. for scopes with fewer rows than partitions.
    pub build_index: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self { existence_check: ExistenceCheck::TableName, build_index: true }
    }
}

/// Inputs loaded and joined, nothing written yet.
pub struct PreparedScope {
    pub paths: ScopePaths,
    pub scope: ScopeMeta,
    pub distance_type: DistanceType,
    pub table: AssembledTable,
}

pub fn prepare(request: &ScopeRequest) -> Result<PreparedScope> {
    let paths = ScopePaths::new(&request.directory, &request.dataset, &request.scope_id);
    paths.validate()?;
    let distance_type = parse_metric(&request.metric)?;

    info!("Loading scope from {}", paths.scopes_dir().display());
    let scope = load_scope_meta(&paths.scope_meta_path())?;
    let projection = load_projection(&paths.projection_path())?;

    let embeddings_path = paths.embeddings_path(&scope.embedding_id);
    info!("Loading embeddings from {}", embeddings_path.display());
    let store = open_embedding_store(&embeddings_path)?;
    let (rows, dim) = store.shape()?;
    info!(rows, dim, "Converting embeddings to vectors");
    let embeddings = store.read_matrix()?;
    let table = attach_vectors(&projection, &embeddings)?;

    Ok(PreparedScope { paths, scope, distance_type, table })
}

#[cfg(feature = "hdf5")]
fn open_embedding_store(path: &Path) -> Result<Box<dyn EmbeddingStore>> {
    Ok(Box::new(crate::embeddings::Hdf5EmbeddingStore::open(path)?))
}

#[cfg(not(feature = "hdf5"))]
fn open_embedding_store(path: &Path) -> Result<Box<dyn EmbeddingStore>> {
    Err(scopelance_core::error::Error::Operation(format!(
        "cannot read {}: built without the `hdf5` feature",
        path.display()
    ))
    .into())
}

/// Write the table (and index) for an already prepared scope, then the sidecar.
pub async fn publish(
    request: &ScopeRequest,
    prepared: PreparedScope,
    settings: &Settings,
    options: PublishOptions,
) -> Result<PublishReport> {
    let PreparedScope { paths, scope, distance_type, table } = prepared;
    let table_name = request.table_name();
    let db_uri = paths.db_uri();
    let rows = table.num_rows();
    let dim = table.dim;

    let conn = open_db(&db_uri).await?;
    let tbl =
        replace_table(&conn, &request.scope_id, &table_name, table, options.existence_check)
            .await?;

    let index = if options.build_index {
        let params = compute_ivfpq_params(dim, distance_type, &settings.index);
        build_ivfpq_index(&tbl, &params).await?;
        Some(params)
    } else {
        None
    };

    let metadata = LanceMetadata::new(request, &paths, &scope);
    let metadata_path = write_sidecar(&settings.output_path(), &metadata)?;
    info!("Metadata saved to {}", metadata_path.display());

    Ok(PublishReport { table_name, db_uri, rows, dim, index, metadata_path })
}

/// Full run: prepare, publish, index, write the sidecar.
pub async fn make_lance(request: &ScopeRequest, settings: &Settings) -> Result<PublishReport> {
    let prepared = prepare(request)?;
    publish(request, prepared, settings, PublishOptions::default()).await
}
