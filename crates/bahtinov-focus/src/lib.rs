//! Focus geometry for Bahtinov mask line sets.
//!
//! The two outer spikes of a Bahtinov pattern cross at a point; the middle
//! spike passes through that point only when the telescope is in focus. This
//! crate measures the perpendicular offset of the crossing from the middle
//! spike and converts it to defocus in micrometers.
//!
//! ```
//! use bahtinov_focus::{evaluate_focus, OpticsCalibration};
//! use bahtinov_lines::{BahtinovLineSet, LineCandidate};
//!
//! let line = |deg: f64, row: f64| LineCandidate { angle_rad: deg.to_radians(), row, value: 1.0 };
//! let set = BahtinovLineSet {
//!     width: 200,
//!     height: 200,
//!     lines: vec![line(20.0, 100.0), line(0.0, 102.0), line(160.0, 100.0)],
//!     fits: Vec::new(),
//! };
//! let eval = evaluate_focus(&set, &OpticsCalibration::new(200.0, 1000.0, 3.8)).unwrap();
//! assert!((eval.assessment.distance_px - 2.0).abs() < 1e-9);
//! ```

mod error;
mod evaluate;
mod geometry;
mod optics;

pub use error::FocusError;
pub use evaluate::{
    canonicalize, evaluate_focus, focus_offset, FocusEvaluation, FocusOffset,
    BAHTINOV_LINE_COUNT, RIGHT_ANGLE_TOLERANCE_RAD,
};
pub use geometry::{GeometricLine, PerpendicularOffset};
pub use optics::{FocusAssessment, OpticsCalibration, CRITICAL_FOCUS_COEFFICIENT};
