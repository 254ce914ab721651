use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegressionError {
    #[error("No training rows")]
    NoRows,

    #[error("Row {row} has {found} features, expected {expected}")]
    FeatureCountMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{rows} training rows but {targets} targets")]
    TargetCountMismatch { rows: usize, targets: usize },

    #[error("Training data contains a non-finite value")]
    NonFinite,

    #[error("Singular value decomposition did not converge")]
    NoConvergence,

    #[error("Least squares solve failed: {0}")]
    Decomposition(&'static str),
}
