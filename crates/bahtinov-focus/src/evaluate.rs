//! Turn a detected line set into a focus assessment.

use crate::geometry::GeometricLine;
use crate::optics::{FocusAssessment, OpticsCalibration};
use crate::FocusError;
use bahtinov_lines::{BahtinovLineSet, LineCandidate};
use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Lines a Bahtinov mask produces.
pub const BAHTINOV_LINE_COUNT: usize = 3;

/// Tolerance on "first line is at a right angle" for [`canonicalize`].
pub const RIGHT_ANGLE_TOLERANCE_RAD: f64 = 1e-4;

/// Intersection of the outer lines and its offset from the middle line.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FocusOffset {
    pub intersection: Point2<f64>,
    /// Point of the middle line closest to `intersection`.
    pub closest: Point2<f64>,
    pub distance_px: f64,
    pub signed_error_px: f64,
}

/// Everything needed to draw and report one frame's focus state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FocusEvaluation {
    /// Candidates after canonical reordering; slot 1 is the middle line.
    pub candidates: [LineCandidate; BAHTINOV_LINE_COUNT],
    /// Full-length lines for the same slots.
    pub lines: [GeometricLine; BAHTINOV_LINE_COUNT],
    pub offset: FocusOffset,
    pub assessment: FocusAssessment,
}

/// Canonical slot order for the three lines.
///
/// When the first line sits at a right angle (within
/// [`RIGHT_ANGLE_TOLERANCE_RAD`]), slots 0 and 2 are swapped; otherwise the
/// detection rank is kept. Slot 1 is the reference (middle) line.
pub fn canonicalize(
    mut lines: [LineCandidate; BAHTINOV_LINE_COUNT],
) -> [LineCandidate; BAHTINOV_LINE_COUNT] {
    if (lines[0].angle_rad - FRAC_PI_2).abs() < RIGHT_ANGLE_TOLERANCE_RAD {
        lines.swap(0, 2);
    }
    lines
}

/// Intersect `outer0` with `outer2` and measure its offset from `middle`.
///
/// The sign is the negated side of the intersection with respect to the
/// directed middle line (see [`GeometricLine::side`]).
pub fn focus_offset(
    outer0: &GeometricLine,
    middle: &GeometricLine,
    outer2: &GeometricLine,
) -> Result<FocusOffset, FocusError> {
    let Some(intersection) = outer0.intersect(outer2) else {
        warn!(
            "outer lines are parallel (slopes {} and {})",
            outer0.slope, outer2.slope
        );
        return Err(FocusError::LinesNotDetected {
            slope: outer0.slope,
        });
    };
    if !(intersection.x.is_finite() && intersection.y.is_finite()) {
        return Err(FocusError::IntersectionComputeFailed {
            what: "intersection",
        });
    }

    let perp = middle
        .perpendicular_offset(intersection)
        .ok_or(FocusError::IntersectionComputeFailed { what: "distance" })?;
    if !perp.distance.is_finite() {
        return Err(FocusError::IntersectionComputeFailed { what: "distance" });
    }

    Ok(FocusOffset {
        intersection,
        closest: perp.closest,
        distance_px: perp.distance,
        signed_error_px: middle.side(intersection) * perp.distance,
    })
}

/// Evaluate focus for a three-line set.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(set, optics), fields(lines = set.len()))
)]
pub fn evaluate_focus(
    set: &BahtinovLineSet,
    optics: &OpticsCalibration,
) -> Result<FocusEvaluation, FocusError> {
    optics.validate()?;
    let candidates: [LineCandidate; BAHTINOV_LINE_COUNT] = set
        .lines
        .as_slice()
        .try_into()
        .map_err(|_| FocusError::WrongLineCount {
            expected: BAHTINOV_LINE_COUNT,
            got: set.len(),
        })?;
    let candidates = canonicalize(candidates);
    let lines =
        candidates.map(|c| GeometricLine::from_scan(c.angle_rad, c.row, set.width, set.height));

    let offset = focus_offset(&lines[0], &lines[1], &lines[2])?;
    let bahtinov_angle = (candidates[2].angle_rad - candidates[0].angle_rad).abs() / 2.0;
    let assessment = optics.assess(offset.distance_px, offset.signed_error_px, bahtinov_angle);
    if !assessment.error_microns.is_finite() {
        return Err(FocusError::IntersectionComputeFailed {
            what: "error_microns",
        });
    }

    debug!(
        "focus: signed error {:.3} px, {:.2} um (critical {:.2} um, within {})",
        assessment.signed_error_px,
        assessment.error_microns,
        assessment.critical_focus_microns,
        assessment.within_critical_focus
    );
    Ok(FocusEvaluation {
        candidates,
        lines,
        offset,
        assessment,
    })
}
