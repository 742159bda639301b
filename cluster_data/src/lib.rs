//! Sampled parameter points with their histograms, cluster labels and the
//! metadata describing how they were produced.
mod cluster;
mod column;
mod dataset;
mod error;
mod metadata;
mod overwrite;
mod table;

pub use cluster::{unique_in_order, ClusterId, RenamePolicy};
pub use column::{DataColumn, DataKind};
pub use dataset::{DataSet, BIN_PREFIX, DEFAULT_CLUSTER_COLUMN};
pub use error::DataError;
pub use metadata::Metadata;
pub use overwrite::{handle_overwrite, handle_overwrite_with, OverwritePolicy};
pub use table::{SampleTable, INDEX_COLUMN};
