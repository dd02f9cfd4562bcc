use thiserror::Error;

/// Errors raised by the clustering engine before the first iteration runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// Empty point set, non-positive k or iteration cap, or ragged vectors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
