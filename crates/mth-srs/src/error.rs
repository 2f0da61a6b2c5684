use thiserror::Error;

/// Failures of the review outcome calculation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SrsError {
    /// The rating is not one of 0, 3 or 5
    #[error("Invalid quality rating: {0}")]
    InvalidQuality(i32),
    /// A computed state falls outside the configured bounds
    #[error("Invalid SRS calculation result: {0}")]
    InvalidResult(String),
}
