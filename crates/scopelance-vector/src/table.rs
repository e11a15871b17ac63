//! LanceDB connection and table replacement.
use anyhow::Result;
use arrow_array::RecordBatchIterator;
use lancedb::{connect, Connection, Table};
use tracing::info;

use scopelance_core::error::Error;

use crate::assemble::AssembledTable;

/// Which name decides whether the previous table gets dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistenceCheck {
    /// Drop `table_name` when a table of that name exists.
    #[default]
    TableName,
    /// Drop `table_name` when a table named after the bare scope id exists.
    /// Older tooling published tables this way; a second run with this check
    /// fails at create time because `table_name` is never dropped.
    ScopeId,
}

pub async fn open_db(uri: &str) -> Result<Connection> {
    Ok(connect(uri).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    Ok(conn.table_names().execute().await?.iter().any(|n| n == name))
}

/// Drop any previous `table_name` (per `check`) and create it from `data`.
pub async fn replace_table(
    conn: &Connection,
    scope_id: &str,
    table_name: &str,
    data: AssembledTable,
    check: ExistenceCheck,
) -> Result<Table> {
    let checked = match check {
        ExistenceCheck::TableName => table_name,
        ExistenceCheck::ScopeId => scope_id,
    };
    if table_exists(conn, checked).await? {
        conn.drop_table(table_name, &[]).await?;
        info!("Existing table '{}' has been removed.", table_name);
    }

    info!("Creating table '{}'", table_name);
    let expected = data.num_rows();
    let reader = Box::new(RecordBatchIterator::new(
        data.batches.into_iter().map(Ok),
        data.schema,
    ));
    let table = conn.create_table(table_name, reader).execute().await?;

    let written = table.count_rows(None).await?;
    if written != expected {
        return Err(Error::Operation(format!(
            "table '{table_name}' holds {written} rows, expected {expected}"
        ))
        .into());
    }
    Ok(table)
}
