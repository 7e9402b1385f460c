//! Bahtinov diffraction-spike detection.
//!
//! ## Quickstart
//!
//! ```
//! use bahtinov_core::RgbImageView;
//! use bahtinov_lines::{LineDetector, LineDetectorParams};
//!
//! let rgb = vec![0u8; 3 * 64 * 64];
//! let view = RgbImageView::packed(64, 64, &rgb).unwrap();
//! let detector = LineDetector::new(LineDetectorParams::default()).unwrap();
//! let lines = detector.detect(&view).unwrap();
//! assert_eq!(lines.len(), 3);
//! ```
//!
//! Algorithm:
//! 1. Build a square-root brightness field and the rotation-safe inscribed
//!    square scan box.
//! 2. For each of 180 one-degree steps, map the box into the frame about the
//!    frame center, resample bilinearly and record the row with the highest
//!    mean brightness (parallel over steps with the `rayon` feature).
//! 3. Greedily pick the `line_count` brightest steps, suppressing `±5°`
//!    around each pick.
//! 4. Re-sample each pick at its angle and fit a parabola around the best row
//!    for a subpixel row position (parallel over lines).
//!
//! Angles stay on the one-degree grid; only rows are refined.

mod detector;
mod refine;
mod scan;
mod suppress;

pub use detector::{
    BahtinovLineSet, LineCandidate, LineDetectError, LineDetector, LineDetectorParams,
};
pub use refine::{refine_line, refine_lines, RefinedLine};
pub use scan::{row_profile, scan_angles, step_angle, AngleScan, ANGLE_STEPS, ANGLE_STEP_RAD};
pub use suppress::select_lines;
