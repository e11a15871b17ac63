use anyhow::Result;
use lancedb::index::{vector::IvfPqIndexBuilder, Index};
use lancedb::{DistanceType, Table};
use tracing::info;

use scopelance_core::config::IndexSettings;
use scopelance_core::error::Error;

use crate::schema::VECTOR_COLUMN;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IvfPqParams {
    pub num_partitions: u32,
    pub num_sub_vectors: u32,
    pub distance_type: DistanceType,
}

/// `dim / 2` sub-vectors, clamped to `[1, max_sub_vectors]`.
pub fn num_sub_vectors(dim: usize, max_sub_vectors: u32) -> u32 {
    let half = u32::try_from(dim / 2).unwrap_or(u32::MAX);
    half.clamp(1, max_sub_vectors.max(1))
}

pub fn compute_ivfpq_params(
    dim: usize,
    distance_type: DistanceType,
    settings: &IndexSettings,
) -> IvfPqParams {
    IvfPqParams {
        num_partitions: settings.num_partitions,
        num_sub_vectors: num_sub_vectors(dim, settings.max_sub_vectors),
        distance_type,
    }
}

/// Map a metric name to a Lance distance type.
///
/// Checked up front so an unknown metric fails before the old table is dropped.
pub fn parse_metric(metric: &str) -> Result<DistanceType, Error> {
    match metric.to_ascii_lowercase().as_str() {
        "l2" | "euclidean" => Ok(DistanceType::L2),
        "cosine" => Ok(DistanceType::Cosine),
        "dot" => Ok(DistanceType::Dot),
        "hamming" => Ok(DistanceType::Hamming),
        _ => Err(Error::UnsupportedMetric(metric.to_string())),
    }
}

pub async fn build_ivfpq_index(table: &Table, params: &IvfPqParams) -> Result<()> {
    info!(
        table = table.name(),
        num_partitions = params.num_partitions,
        num_sub_vectors = params.num_sub_vectors,
        distance = ?params.distance_type,
        "Creating index"
    );
    table
        .create_index(
            &[VECTOR_COLUMN],
            Index::IvfPq(
                IvfPqIndexBuilder::default()
                    .distance_type(params.distance_type)
                    .num_partitions(params.num_partitions)
                    .num_sub_vectors(params.num_sub_vectors),
            ),
        )
        .execute()
        .await?;
    Ok(())
}
