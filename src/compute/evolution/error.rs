//! Errors that abort a training run.

use crate::schema::ConfigError;

/// Training errors.
///
/// Configuration problems are recoverable by the caller; the invariant and scoring variants
/// terminate the run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrainingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("Selection invariant violated: expected {expected} selected individuals, found {actual}")]
    SelectionInvariantViolation { expected: usize, actual: usize },
    #[error("Recombination invariant violated: expected {expected} offspring, produced {actual}")]
    RecombinationInvariantViolation { expected: usize, actual: usize },
    #[error("Individual {index} has non-finite or out-of-range performance {value}")]
    NonFiniteScore { index: usize, value: f64 },
}
