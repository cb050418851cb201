//! Error types in linfa-gmm
//!

use thiserror::Error;

use linfa_linalg::LinalgError;

pub type Result<T> = std::result::Result<T, GmmError>;

/// An error when building or fitting a Gaussian mixture
#[derive(Error, Debug)]
pub enum GmmError {
    /// When any of the hyperparameters are set the wrong value
    #[error("Invalid value encountered: {0}")]
    InvalidValue(String),
    /// When a model or a fit is requested over no components, no features or no points
    #[error("empty input")]
    EmptyInput,
    /// When points, means or covariances disagree on the number of features
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    /// When mixture weights are out of range or do not sum to one
    #[error("invalid mixture weights: {0}")]
    InvalidWeights(String),
    /// When a covariance cannot be factorized or inverted
    #[error(
        "Linalg Error: \
    a component has an ill-defined covariance matrix (for instance caused by singleton \
    or collapsed samples). Try to decrease the number of components, \
    or increase reg_covariance. Error: {0}"
    )]
    SingularMatrix(#[from] LinalgError),
    /// When fitting EM algorithm does not converge
    #[error("Fitting failed: {0}")]
    NotConverged(String),
}
