use arrow_schema::{DataType, Field, Schema, SchemaRef};
use std::sync::Arc;

pub const VECTOR_COLUMN: &str = "vector";

pub fn vector_field(dim: i32) -> Field {
    let item = Arc::new(Field::new("item", DataType::Float32, true));
    Field::new(VECTOR_COLUMN, DataType::FixedSizeList(item, dim), true)
}

/// Projection columns followed by `vector`. An existing `vector` column is
/// dropped so the assembled one replaces it.
pub fn with_vector_column(projection: &Schema, dim: i32) -> SchemaRef {
    let mut fields: Vec<Field> = projection
        .fields()
        .iter()
        .filter(|f| f.name() != VECTOR_COLUMN)
        .map(|f| f.as_ref().clone())
        .collect();
    fields.push(vector_field(dim));
    Arc::new(Schema::new(fields))
}
