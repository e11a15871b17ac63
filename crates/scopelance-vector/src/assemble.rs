//! Attach one embedding per projection row as a `vector` column.
use anyhow::Result;
use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array, RecordBatch};
use arrow_schema::{DataType, Field, SchemaRef};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

use scopelance_core::error::Error;
use scopelance_core::types::EmbeddingMatrix;

use crate::schema::{with_vector_column, VECTOR_COLUMN};
use crate::scope::Projection;

/// Projection rows with their vectors, ready to be written as a table.
#[derive(Debug, Clone)]
pub struct AssembledTable {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
    pub dim: usize,
}

impl AssembledTable {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

/// Row `i` of the projection gets row `i` of `embeddings`.
///
/// Correspondence is positional only, so both sides must have the same row
/// count; a mismatch is rejected before anything is built.
pub fn attach_vectors(
    projection: &Projection,
    embeddings: &EmbeddingMatrix,
) -> Result<AssembledTable> {
    let projection_rows = projection.num_rows();
    if projection_rows != embeddings.rows() {
        return Err(Error::EmbeddingMismatch {
            projection_rows,
            embedding_rows: embeddings.rows(),
        }
        .into());
    }
    let dim = i32::try_from(embeddings.dim()).map_err(|_| {
        Error::InvalidEmbeddings(format!("vector dimension {} is too large", embeddings.dim()))
    })?;
    let schema = with_vector_column(&projection.schema, dim);
    let item = Arc::new(Field::new("item", DataType::Float32, true));

    let pb = ProgressBar::new(projection_rows as u64);
    let template = concat!(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] ",
        "{pos}/{len} rows ({percent}%) {msg}"
    );
    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        pb.set_style(style.progress_chars("#>-"));
    }

    let mut offset = 0usize;
    let mut batches = Vec::with_capacity(projection.batches.len());
    for batch in &projection.batches {
        let n = batch.num_rows();
        let values = Float32Array::from(embeddings.rows_slice(offset, n).to_vec());
        let vectors = FixedSizeListArray::try_new(item.clone(), dim, Arc::new(values), None)?;
        let mut columns: Vec<ArrayRef> = batch
            .schema()
            .fields()
            .iter()
            .zip(batch.columns())
            .filter(|(f, _)| f.name() != VECTOR_COLUMN)
            .map(|(_, c)| c.clone())
            .collect();
        columns.push(Arc::new(vectors));
        batches.push(RecordBatch::try_new(schema.clone(), columns)?);
        offset += n;
        pb.set_position(offset as u64);
    }
    pb.finish_with_message("vectors attached");
    Ok(AssembledTable { schema, batches, dim: embeddings.dim() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::{Array, Int64Array, StringArray};
    use arrow_array::cast::AsArray;
    use arrow_schema::Schema;

    fn projection(batch_sizes: &[usize]) -> Projection {
        let schema = Arc::new(Schema::new(vec![
            Field::new("index", DataType::Int64, false),
            Field::new("text", DataType::Utf8, true),
        ]));
        let mut start = 0i64;
        let batches = batch_sizes
            .iter()
            .map(|&n| {
                let ids: Vec<i64> = (start..start + n as i64).collect();
                let texts: Vec<String> = ids.iter().map(|i| format!("row {i}")).collect();
                start += n as i64;
                RecordBatch::try_new(
                    schema.clone(),
                    vec![Arc::new(Int64Array::from(ids)), Arc::new(StringArray::from(texts))],
                )
                .unwrap()
            })
            .collect();
        Projection { schema, batches }
    }

    fn matrix(rows: usize, dim: usize) -> EmbeddingMatrix {
        let values = (0..rows * dim).map(|v| v as f32).collect();
        EmbeddingMatrix::new(rows, dim, values).unwrap()
    }

    #[test]
    fn vectors_follow_row_order_across_batches() {
        let out = attach_vectors(&projection(&[2, 3]), &matrix(5, 4)).expect("assemble");
        assert_eq!(out.num_rows(), 5);
        assert_eq!(out.dim, 4);
        assert_eq!(out.batches.len(), 2);
        let second = &out.batches[1];
        let vectors = second.column_by_name("vector").unwrap().as_fixed_size_list();
        assert_eq!(vectors.value_length(), 4);
        // first row of the second batch is global row 2
        let row = vectors.value(0);
        let row = row.as_primitive::<arrow_array::types::Float32Type>();
        assert_eq!(row.values().to_vec(), vec![8.0, 9.0, 10.0, 11.0]);
        let idx = second
            .column_by_name("index")
            .unwrap()
            .as_primitive::<arrow_array::types::Int64Type>();
        assert_eq!(idx.value(0), 2);
        assert!(!vectors.is_null(0));
    }

    #[test]
    fn fewer_embeddings_than_rows_is_rejected() {
        let err = attach_vectors(&projection(&[3]), &matrix(2, 4)).expect_err("mismatch");
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::EmbeddingMismatch { projection_rows: 3, embedding_rows: 2 })
        ));
    }

    #[test]
    fn more_embeddings_than_rows_is_rejected() {
        let err = attach_vectors(&projection(&[3]), &matrix(4, 4)).expect_err("mismatch");
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::EmbeddingMismatch { .. })));
    }

    #[test]
    fn empty_projection_yields_empty_table() {
        let out = attach_vectors(&projection(&[]), &matrix(0, 8)).expect("assemble");
        assert_eq!(out.num_rows(), 0);
        assert_eq!(out.schema.fields().len(), 3);
    }
}
