use bahtinov_core::{Cancelled, ImageError};

/// Errors returned by the line detector.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LineDetectError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("refined row {row:.3} of line {index} is outside the {height}-row frame")]
    RowOutOfBounds { index: usize, row: f64, height: usize },
    #[error("invalid detector parameters: {0}")]
    InvalidParams(String),
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}
