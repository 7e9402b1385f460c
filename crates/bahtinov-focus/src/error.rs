/// Errors returned by focus evaluation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FocusError {
    /// The evaluator needs exactly three lines.
    #[error("expected {expected} lines, got {got}")]
    WrongLineCount { expected: usize, got: usize },
    /// The two outer lines are parallel, so they have no intersection.
    #[error("outer lines are parallel (slope {slope}), no intersection")]
    LinesNotDetected { slope: f64 },
    /// A non-finite value appeared while computing `what`.
    #[error("focus geometry produced a non-finite {what}")]
    IntersectionComputeFailed { what: &'static str },
    #[error("invalid optics calibration: {0}")]
    InvalidCalibration(String),
}
