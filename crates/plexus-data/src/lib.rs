//! # plexus-data
//!
//! Dataset loading, train/val/test splitting, and adjacency normalization
//! for the plexus GCN pipeline.
//!
//! - [`dataset`]: the page graph, target table, CSV loading, and a seeded
//!   synthetic planted-partition generator
//! - [`split`]: fixed-quota random splitting with a shared one-hot encoder
//! - [`adjacency`]: the symmetric `D^{-1/2}(A+I)D^{-1/2}` operator
//! - [`resolver`]: external id → positional index tensors

pub mod adjacency;
pub mod dataset;
pub mod resolver;
pub mod split;

pub use dataset::{PageDataset, PageGraph, TargetTable};
pub use split::{LabelEncoder, Split, Subset};

/// Page-type labels used by the synthetic dataset, after the categories of
/// the page-page network this pipeline was built around.
pub const PAGE_TYPES: [&str; 4] = ["company", "government", "politician", "tvshow"];
