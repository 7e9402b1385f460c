use super::{BahtinovLineSet, LineDetectError, LineDetectorParams};
use crate::refine::refine_lines;
use crate::scan::scan_angles;
use crate::suppress::select_lines;
use bahtinov_core::{build_intensity_field, CancelFlag, IntensityField, RgbImageView};
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Finds the brightest straight spikes of a Bahtinov diffraction pattern.
#[derive(Clone, Debug)]
pub struct LineDetector {
    params: LineDetectorParams,
}

impl LineDetector {
    /// Create a detector, rejecting unusable parameters.
    pub fn new(params: LineDetectorParams) -> Result<Self, LineDetectError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Detector parameters.
    #[inline]
    pub fn params(&self) -> &LineDetectorParams {
        &self.params
    }

    /// Detect lines in a square-cropped RGB frame.
    pub fn detect(&self, image: &RgbImageView<'_>) -> Result<BahtinovLineSet, LineDetectError> {
        self.detect_cancellable(image, &CancelFlag::new())
    }

    /// Like [`LineDetector::detect`], polling `cancel` between stages.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, image, cancel),
            fields(width = image.width(), height = image.height())
        )
    )]
    pub fn detect_cancellable(
        &self,
        image: &RgbImageView<'_>,
        cancel: &CancelFlag,
    ) -> Result<BahtinovLineSet, LineDetectError> {
        let field =
            build_intensity_field(image, self.params.intensity, self.params.box_margin_px)?;
        cancel.check()?;
        self.detect_in_field(&field, cancel)
    }

    /// Run scan, suppression and refinement on a prebuilt brightness field.
    pub fn detect_in_field(
        &self,
        field: &IntensityField,
        cancel: &CancelFlag,
    ) -> Result<BahtinovLineSet, LineDetectError> {
        let scan = scan_angles(field);
        cancel.check()?;

        let candidates = select_lines(&scan, self.params.line_count, self.params.suppression_deg);
        cancel.check()?;

        let refined = refine_lines(field, &candidates, self.params.refine_half_width);
        cancel.check()?;

        let height = field.height();
        for (index, r) in refined.iter().enumerate() {
            let row = r.candidate.row;
            if !row.is_finite() || row < 0.0 || row >= height as f64 {
                return Err(LineDetectError::RowOutOfBounds { index, row, height });
            }
        }

        let set = BahtinovLineSet {
            width: field.width(),
            height,
            lines: refined.iter().map(|r| r.candidate).collect(),
            fits: refined.iter().map(|r| r.fit.kind).collect(),
        };
        debug!(
            "detected {} lines (rows {:?}, {} fit fallbacks)",
            set.len(),
            set.rows(),
            set.fallback_count()
        );
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bahtinov_core::synthetic::{SpikePattern, SyntheticSpike};
    use bahtinov_core::{Cancelled, ImageError};

    #[test]
    fn rejects_zero_line_count() {
        let params = LineDetectorParams {
            line_count: 0,
            ..LineDetectorParams::default()
        };
        assert!(matches!(
            LineDetector::new(params),
            Err(LineDetectError::InvalidParams(_))
        ));
    }

    #[test]
    fn tiny_frame_is_rejected() {
        let rgb = vec![0u8; 3 * 12 * 12];
        let view = RgbImageView::packed(12, 12, &rgb).expect("view");
        let detector = LineDetector::new(LineDetectorParams::default()).expect("detector");
        assert_eq!(
            detector.detect(&view).unwrap_err(),
            LineDetectError::Image(ImageError::EmptyScanBox {
                width: 12,
                height: 12
            })
        );
    }

    #[test]
    fn cancelled_flag_stops_before_scanning() {
        let pattern =
            SpikePattern::new(64, 64).with_spike(SyntheticSpike::new(10.0, 30.0, 100.0));
        let rgb = pattern.render_rgb();
        let view = RgbImageView::packed(64, 64, &rgb).expect("view");
        let detector = LineDetector::new(LineDetectorParams::default()).expect("detector");

        let cancel = CancelFlag::new();
        cancel.cancel();
        assert_eq!(
            detector.detect_cancellable(&view, &cancel).unwrap_err(),
            LineDetectError::Cancelled(Cancelled)
        );
    }
}
