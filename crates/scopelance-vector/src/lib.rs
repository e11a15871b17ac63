//! Publishing latent-scope scopes into LanceDB.
//!
//! `scope` loads the parquet projection and scope JSON, `embeddings` opens the
//! HDF5 store, `assemble` attaches vectors by row position, `table` and
//! `index_build` write the table and its IVF_PQ index, and `pipeline` runs
//! the stages end to end.
pub mod assemble;
#[cfg(feature = "hdf5")]
pub mod embeddings;
pub mod index_build;
pub mod pipeline;
pub mod schema;
pub mod scope;
pub mod table;

pub use pipeline::{make_lance, PublishOptions, PublishReport};
