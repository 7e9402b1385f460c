use super::LineDetectError;
use crate::scan::ANGLE_STEPS;
use bahtinov_core::{IntensityMode, DEFAULT_BOX_MARGIN_PX};
use serde::{Deserialize, Serialize};

/// Configuration for the line detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineDetectorParams {
    /// Number of lines to extract. A Bahtinov mask produces 3.
    pub line_count: usize,
    /// Half-width of the angular suppression window, in one-degree steps.
    ///
    /// Every selected line zeroes the `±suppression_deg` neighbourhood of its
    /// orientation before the next one is picked.
    pub suppression_deg: usize,
    /// Half-width of the quadratic fit window used for subpixel rows.
    pub refine_half_width: usize,
    /// Margin (pixels) subtracted from the inscribed square side.
    pub box_margin_px: f64,
    /// Which color information feeds the brightness field.
    pub intensity: IntensityMode,
}

impl Default for LineDetectorParams {
    fn default() -> Self {
        Self {
            line_count: 3,
            suppression_deg: 5,
            refine_half_width: 2,
            box_margin_px: DEFAULT_BOX_MARGIN_PX,
            intensity: IntensityMode::Luminance,
        }
    }
}

impl LineDetectorParams {
    /// Same parameters, different brightness source.
    pub fn with_intensity(mut self, intensity: IntensityMode) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn validate(&self) -> Result<(), LineDetectError> {
        if self.line_count == 0 || self.line_count > ANGLE_STEPS {
            return Err(LineDetectError::InvalidParams(format!(
                "line_count must be in 1..={ANGLE_STEPS}, got {}",
                self.line_count
            )));
        }
        if self.suppression_deg >= ANGLE_STEPS / 2 {
            return Err(LineDetectError::InvalidParams(format!(
                "suppression_deg must be below {}, got {}",
                ANGLE_STEPS / 2,
                self.suppression_deg
            )));
        }
        if self.refine_half_width == 0 {
            return Err(LineDetectError::InvalidParams(
                "refine_half_width must be at least 1".to_string(),
            ));
        }
        if !self.box_margin_px.is_finite() || self.box_margin_px < 0.0 {
            return Err(LineDetectError::InvalidParams(format!(
                "box_margin_px must be finite and non-negative, got {}",
                self.box_margin_px
            )));
        }
        Ok(())
    }
}
