//! Error types for the plexus pipeline.

use thiserror::Error;

/// Unified error type for all plexus operations.
///
/// Every failure in the pipeline surfaces through this type; nothing is
/// caught or retried on the way up (the pipeline is a linear batch job).
#[derive(Error, Debug)]
pub enum PlexusError {
    /// Dataset construction/loading errors (duplicate ids, malformed rows)
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// A node identifier that cannot be resolved to a graph position
    #[error("Unknown node id '{0}'")]
    UnknownNode(String),

    /// Train/validation/test partitioning errors
    #[error("Split error: {0}")]
    Split(String),

    /// Configuration validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Figure construction/rendering errors
    #[error("Report error: {0}")]
    Report(String),

    /// Mathematical/numerical errors (e.g., NaN loss)
    #[error("Numerical error: {0}")]
    Numerical(String),

    /// Tensor operation errors from the model backend
    #[error("Tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// I/O errors (dataset files, checkpoints, logs, plots)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing/writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlexusError {
    /// Creates a dataset error.
    pub fn dataset(message: impl Into<String>) -> Self {
        PlexusError::Dataset(message.into())
    }

    /// Creates an unknown-node error.
    pub fn unknown_node(id: impl Into<String>) -> Self {
        PlexusError::UnknownNode(id.into())
    }

    /// Creates a split error.
    pub fn split(message: impl Into<String>) -> Self {
        PlexusError::Split(message.into())
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        PlexusError::Config(message.into())
    }

    /// Creates a report error.
    pub fn report(message: impl Into<String>) -> Self {
        PlexusError::Report(message.into())
    }

    /// Creates a numerical error.
    pub fn numerical(message: impl Into<String>) -> Self {
        PlexusError::Numerical(message.into())
    }
}

/// Result type alias for plexus operations.
pub type Result<T> = std::result::Result<T, PlexusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let data_err = PlexusError::dataset("duplicate id 'p17'");
        assert!(matches!(data_err, PlexusError::Dataset(_)));

        let node_err = PlexusError::unknown_node("p404");
        assert!(matches!(node_err, PlexusError::UnknownNode(_)));
        assert_eq!(node_err.to_string(), "Unknown node id 'p404'");

        let cfg_err = PlexusError::config("dropout out of range");
        assert!(matches!(cfg_err, PlexusError::Config(_)));
    }
}
