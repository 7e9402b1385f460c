//! Telescope/camera constants and the pixel to microns conversion.

use crate::FocusError;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;

/// Empirical tolerance coefficient: critical focus zone `k * (f/D)^2`, in
/// meters, with `f` and `D` in meters.
pub const CRITICAL_FOCUS_COEFFICIENT: f64 = 8.99999974990351e-7;

/// Optics of the imaging train.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpticsCalibration {
    /// Clear aperture `D`, millimeters.
    pub aperture_mm: f64,
    /// Focal length `f`, millimeters.
    pub focal_length_mm: f64,
    /// Sensor pixel pitch, micrometers.
    pub pixel_size_um: f64,
}

impl Default for OpticsCalibration {
    fn default() -> Self {
        Self {
            aperture_mm: 200.0,
            focal_length_mm: 1000.0,
            pixel_size_um: 3.8,
        }
    }
}

/// Focus error of one frame expressed in pixels and microns.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FocusAssessment {
    /// Distance from the outer-line intersection to the middle line.
    pub distance_px: f64,
    /// `distance_px` with the in/out direction sign.
    pub signed_error_px: f64,
    /// Defocus at the focal plane, micrometers (unsigned).
    pub error_microns: f64,
    pub within_critical_focus: bool,
    /// Critical focus zone, micrometers.
    pub critical_focus_microns: f64,
    /// Half the angle between the outer lines.
    pub bahtinov_angle_rad: f64,
}

impl OpticsCalibration {
    pub fn new(aperture_mm: f64, focal_length_mm: f64, pixel_size_um: f64) -> Self {
        Self {
            aperture_mm,
            focal_length_mm,
            pixel_size_um,
        }
    }

    /// Reject values that would make the conversion meaningless.
    pub fn validate(&self) -> Result<(), FocusError> {
        for (name, v) in [
            ("aperture_mm", self.aperture_mm),
            ("focal_length_mm", self.focal_length_mm),
            ("pixel_size_um", self.pixel_size_um),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(FocusError::InvalidCalibration(format!(
                    "{name} must be finite and positive, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Focal ratio `f / D`.
    #[inline]
    pub fn focal_ratio(&self) -> f64 {
        self.focal_length_mm / self.aperture_mm
    }

    /// Image-plane pixels of line offset per micron of defocus for a mask
    /// whose outer lines are `±bahtinov_angle_rad` from the middle one.
    pub fn pixels_per_micron(&self, bahtinov_angle_rad: f64) -> f64 {
        let d_m = self.aperture_mm / 1000.0;
        let f_m = self.focal_length_mm / 1000.0;
        (9.0 / 32.0) * d_m / (f_m * self.pixel_size_um)
            * (1.0 + FRAC_PI_4.cos() * (1.0 + bahtinov_angle_rad.tan()))
    }

    /// Critical focus zone in meters.
    #[inline]
    pub fn critical_focus_m(&self) -> f64 {
        let ratio = self.focal_ratio();
        CRITICAL_FOCUS_COEFFICIENT * ratio * ratio
    }

    /// Convert a pixel-space offset into a [`FocusAssessment`].
    pub fn assess(
        &self,
        distance_px: f64,
        signed_error_px: f64,
        bahtinov_angle_rad: f64,
    ) -> FocusAssessment {
        let error_microns = distance_px / self.pixels_per_micron(bahtinov_angle_rad);
        let critical = self.critical_focus_m();
        FocusAssessment {
            distance_px,
            signed_error_px,
            error_microns,
            within_critical_focus: (error_microns * 1e-6).abs() < critical.abs(),
            critical_focus_microns: critical * 1e6,
            bahtinov_angle_rad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn microns_match_closed_form() {
        let optics = OpticsCalibration::new(200.0, 1000.0, 3.8);
        let ppm = (9.0 / 32.0) * 0.2 / (1.0 * 3.8)
            * (1.0 + (45f64).to_radians().cos() * (1.0 + 0.3f64.tan()));
        assert_relative_eq!(optics.pixels_per_micron(0.3), ppm, max_relative = 1e-12);

        let a = optics.assess(2.0, -2.0, 0.3);
        assert_relative_eq!(a.error_microns, 2.0 / ppm, max_relative = 1e-12);
        assert_relative_eq!(a.error_microns, 70.156, epsilon = 1e-2);
        assert_relative_eq!(a.critical_focus_microns, 22.5, epsilon = 1e-6);
        assert!(!a.within_critical_focus);
        assert_eq!(a.signed_error_px, -2.0);

        let b = optics.assess(0.5, 0.5, 0.3);
        assert!(b.within_critical_focus);
    }

    #[test]
    fn critical_focus_scales_with_focal_ratio_squared() {
        let f5 = OpticsCalibration::new(200.0, 1000.0, 3.8).critical_focus_m();
        let f10 = OpticsCalibration::new(100.0, 1000.0, 3.8).critical_focus_m();
        assert_relative_eq!(f10 / f5, 4.0, max_relative = 1e-12);
        assert_relative_eq!(f5, CRITICAL_FOCUS_COEFFICIENT * 25.0, max_relative = 1e-15);
    }

    #[test]
    fn rejects_non_positive_constants() {
        assert!(OpticsCalibration::default().validate().is_ok());
        for bad in [
            OpticsCalibration::new(0.0, 1000.0, 3.8),
            OpticsCalibration::new(200.0, -1.0, 3.8),
            OpticsCalibration::new(200.0, 1000.0, f64::NAN),
        ] {
            assert!(matches!(
                bad.validate(),
                Err(FocusError::InvalidCalibration(_))
            ));
        }
    }
}
