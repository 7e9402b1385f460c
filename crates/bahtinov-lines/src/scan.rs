//! Coarse rotational scan over one-degree angle steps.
//!
//! For every step the scan box is mapped into the frame about the frame
//! center, resampled bilinearly, and averaged per row. A bright straight
//! spike aligned with the step shows up as one row with a high mean.

use bahtinov_core::IntensityField;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Number of angle steps covering `[0, π)`.
pub const ANGLE_STEPS: usize = 180;
/// Angular size of one step, radians.
pub const ANGLE_STEP_RAD: f64 = PI / ANGLE_STEPS as f64;

/// Angle of scan step `step`, radians.
#[inline]
pub fn step_angle(step: usize) -> f64 {
    step as f64 * ANGLE_STEP_RAD
}

/// Best row per angle step. Slot `d` belongs to angle `d * ANGLE_STEP_RAD`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngleScan {
    /// Absolute image row with the highest mean brightness.
    pub rows: Vec<usize>,
    /// That row's mean brightness.
    pub values: Vec<f64>,
}

impl AngleScan {
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Mean brightness of every scan-box row after mapping the box at `angle_rad`.
///
/// Entry `k` is scan row `scan_box.top + k`. Box pixel `(u, v)` is sampled at
/// `x = cx + (u-cx)·cos + (v-cy)·sin`, `y = cy + (u-cx)·sin - (v-cy)·cos`, so
/// row `v` follows the image line with direction `(cos, sin)` through
/// `(cx + (v-cy)·sin, cy - (v-cy)·cos)`.
pub fn row_profile(field: &IntensityField, angle_rad: f64) -> Vec<f64> {
    let scan_box = field.scan_box();
    let mut out = vec![0.0f64; scan_box.side()];
    row_profile_into(field, angle_rad, &mut out);
    out
}

fn row_profile_into(field: &IntensityField, angle_rad: f64, out: &mut [f64]) {
    let scan_box = field.scan_box();
    let c = field.center();
    let (sin, cos) = angle_rad.sin_cos();
    let inv_cols = 1.0 / scan_box.side() as f64;

    for (mean, v) in out.iter_mut().zip(scan_box.rows()) {
        let dy = v as f64 - c.y;
        let base_x = c.x + dy * sin;
        let base_y = c.y - dy * cos;
        let mut sum = 0.0f64;
        for u in scan_box.cols() {
            let dx = u as f64 - c.x;
            sum += field.sample_bilinear(base_x + dx * cos, base_y + dx * sin);
        }
        *mean = sum * inv_cols;
    }
}

/// Index and value of the first maximum.
pub(crate) fn argmax(values: &[f64]) -> (usize, f64) {
    let mut best = (0usize, f64::NEG_INFINITY);
    for (i, &v) in values.iter().enumerate() {
        if v > best.1 {
            best = (i, v);
        }
    }
    best
}

fn scan_step(field: &IntensityField, step: usize) -> (usize, f64) {
    let profile = row_profile(field, step_angle(step));
    let (k, value) = argmax(&profile);
    (field.scan_box().top + k, value)
}

/// Scan all [`ANGLE_STEPS`] orientations.
///
/// Each step is independent and writes only its own slot, so with the
/// `rayon` feature the steps run in parallel without changing the result.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(field), fields(side = field.scan_box().side()))
)]
pub fn scan_angles(field: &IntensityField) -> AngleScan {
    #[cfg(feature = "rayon")]
    let slots: Vec<(usize, f64)> = (0..ANGLE_STEPS)
        .into_par_iter()
        .map(|step| scan_step(field, step))
        .collect();
    #[cfg(not(feature = "rayon"))]
    let slots: Vec<(usize, f64)> = (0..ANGLE_STEPS)
        .map(|step| scan_step(field, step))
        .collect();

    let (rows, values) = slots.into_iter().unzip();
    AngleScan { rows, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bahtinov_core::synthetic::{SpikePattern, SyntheticSpike};
    use bahtinov_core::{build_intensity_field, IntensityMode, RgbImageView};

    fn field_for(pattern: &SpikePattern) -> IntensityField {
        let rgb = pattern.render_rgb();
        let view = RgbImageView::packed(pattern.width, pattern.height, &rgb).expect("view");
        build_intensity_field(&view, IntensityMode::Luminance, 8.0).expect("field")
    }

    #[test]
    fn profile_peaks_on_the_spike_row() {
        let pattern = SpikePattern::new(128, 128)
            .with_spike(SyntheticSpike::new(30.0, 70.0, 180.0).with_sigma(1.0));
        let field = field_for(&pattern);
        let profile = row_profile(&field, 30f64.to_radians());
        let (k, _) = argmax(&profile);
        assert_eq!(field.scan_box().top + k, 70);
    }

    #[test]
    fn scan_finds_spike_orientation() {
        let pattern = SpikePattern::new(128, 128)
            .with_spike(SyntheticSpike::new(123.0, 60.0, 200.0).with_sigma(1.2));
        let field = field_for(&pattern);
        let scan = scan_angles(&field);
        assert_eq!(scan.len(), ANGLE_STEPS);

        let (best, _) = argmax(&scan.values);
        assert_eq!(best, 123);
        assert_eq!(scan.rows[best], 60);
    }

    #[test]
    fn scan_is_deterministic() {
        let pattern = SpikePattern::new(96, 96)
            .with_noise(8.0, 3)
            .with_spike(SyntheticSpike::new(45.0, 50.0, 120.0));
        let field = field_for(&pattern);
        assert_eq!(scan_angles(&field), scan_angles(&field));
    }
}
