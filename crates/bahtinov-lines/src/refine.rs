//! Subpixel row refinement of selected line candidates.

use crate::detector::LineCandidate;
use crate::scan::{argmax, row_profile};
use bahtinov_core::{fit_peak_quadratic, IntensityField, PeakFit};
use serde::{Deserialize, Serialize};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A candidate after refinement, with the fit that produced its row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefinedLine {
    pub candidate: LineCandidate,
    pub fit: PeakFit,
}

/// Re-sample the box at the candidate's angle and fit the row peak.
///
/// Only `row` changes; the angle keeps the one-degree resolution of the
/// coarse scan.
pub fn refine_line(
    field: &IntensityField,
    candidate: LineCandidate,
    half_width: usize,
) -> RefinedLine {
    let profile = row_profile(field, candidate.angle_rad);
    let (k, _) = argmax(&profile);
    let fit = fit_peak_quadratic(&profile, k, half_width);
    RefinedLine {
        candidate: LineCandidate {
            row: field.scan_box().top as f64 + fit.position,
            ..candidate
        },
        fit,
    }
}

/// Refine every candidate; output slot `i` belongs to `candidates[i]`.
pub fn refine_lines(
    field: &IntensityField,
    candidates: &[LineCandidate],
    half_width: usize,
) -> Vec<RefinedLine> {
    #[cfg(feature = "rayon")]
    let refined: Vec<RefinedLine> = candidates
        .par_iter()
        .map(|&c| refine_line(field, c, half_width))
        .collect();
    #[cfg(not(feature = "rayon"))]
    let refined: Vec<RefinedLine> = candidates
        .iter()
        .map(|&c| refine_line(field, c, half_width))
        .collect();
    refined
}

#[cfg(test)]
mod tests {
    use super::*;
    use bahtinov_core::synthetic::{SpikePattern, SyntheticSpike};
    use bahtinov_core::{build_intensity_field, IntensityMode, PeakFitKind, RgbImageView};

    #[test]
    fn refined_row_lands_between_pixels() {
        let pattern = SpikePattern::new(160, 160)
            .with_background(5.0)
            .with_spike(SyntheticSpike::new(20.0, 83.4, 200.0).with_sigma(1.6));
        let rgb = pattern.render_rgb();
        let view = RgbImageView::packed(160, 160, &rgb).expect("view");
        let field = build_intensity_field(&view, IntensityMode::Luminance, 8.0).expect("field");

        let coarse = LineCandidate {
            angle_rad: 20f64.to_radians(),
            row: 83.0,
            value: 0.0,
        };
        let refined = refine_line(&field, coarse, 2);
        assert_eq!(refined.fit.kind, PeakFitKind::Quadratic);
        assert_eq!(refined.candidate.angle_rad, coarse.angle_rad);
        assert!(
            (refined.candidate.row - 83.4).abs() < 0.15,
            "row {}",
            refined.candidate.row
        );
    }
}
