//! Loading a scope: the `-input.parquet` projection and its JSON metadata.
use anyhow::{Context, Result};
use arrow_array::RecordBatch;
use arrow_schema::{Schema, SchemaRef};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use scopelance_core::types::ScopeMeta;

/// Tabular projection of a scope, one row per dataset item, in file order.
#[derive(Debug, Clone)]
pub struct Projection {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
}

impl Projection {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

pub fn load_scope_meta(path: &Path) -> Result<ScopeMeta> {
    let file = File::open(path)
        .with_context(|| format!("opening scope metadata {}", path.display()))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("parsing scope metadata {}", path.display()))
}

/// Pandas writes its row index as `__index_level_N__`; it is not a data column.
fn is_pandas_index(name: &str) -> bool {
    name.starts_with("__index_level_") && name.ends_with("__")
}

/// Named index columns listed under `index_columns` in the `pandas` schema
/// metadata. Range indexes are stored as objects and have no column.
fn pandas_index_columns(schema: &Schema) -> Vec<String> {
    let Some(raw) = schema.metadata().get("pandas") else {
        return Vec::new();
    };
    let meta: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("ignoring unreadable pandas metadata: {e}");
            return Vec::new();
        }
    };
    meta.get("index_columns")
        .and_then(serde_json::Value::as_array)
        .map(|cols| cols.iter().filter_map(|c| c.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

pub fn load_projection(path: &Path) -> Result<Projection> {
    let file = File::open(path).with_context(|| format!("opening projection {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading parquet footer of {}", path.display()))?;
    let file_schema = builder.schema().clone();
    let reader = builder.build()?;

    let named_index = pandas_index_columns(&file_schema);
    let keep: Vec<usize> = file_schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| !is_pandas_index(f.name()) && !named_index.contains(f.name()))
        .map(|(i, _)| i)
        .collect();
    // Schema metadata (pandas/arrow bookkeeping) is not carried into the table.
    let schema = Arc::new(Schema::new(
        keep.iter().map(|&i| file_schema.field(i).clone()).collect::<Vec<_>>(),
    ));

    let mut batches = Vec::new();
    for batch in reader {
        let batch = batch.with_context(|| format!("decoding {}", path.display()))?;
        let columns = keep.iter().map(|&i| batch.column(i).clone()).collect();
        batches.push(RecordBatch::try_new(schema.clone(), columns)?);
    }
    let projection = Projection { schema, batches };
    debug!(
        rows = projection.num_rows(),
        columns = projection.schema.fields().len(),
        "projection loaded"
    );
    Ok(projection)
}
