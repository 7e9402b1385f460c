//! End-to-end focus analysis of one frame: line detection, then geometry.

use bahtinov_core::{CancelFlag, Cancelled, ImageError, IntensityMode, RgbImageView};
use bahtinov_focus::{
    evaluate_focus, FocusAssessment, FocusError, FocusEvaluation, OpticsCalibration,
    BAHTINOV_LINE_COUNT,
};
use bahtinov_lines::{BahtinovLineSet, LineDetectError, LineDetector, LineDetectorParams};
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Coarse classification of why a frame produced no assessment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameErrorKind {
    /// Unusable buffer or scan box, or a refined row left the frame.
    InvalidFrame,
    /// Outer lines are parallel.
    LinesNotDetected,
    /// Non-finite geometry.
    IntersectionComputeFailed,
    InvalidCalibration,
    InvalidParams,
    Cancelled,
    /// Reading or decoding input failed.
    Io,
}

/// Errors returned by [`FocusAnalyzer`] and the image helpers.
#[derive(thiserror::Error, Debug)]
pub enum AnalyzeError {
    #[error("invalid frame: {0}")]
    InvalidFrame(LineDetectError),
    #[error("invalid analyzer parameters: {0}")]
    InvalidParams(String),
    #[error("lines not detected: {0}")]
    LinesNotDetected(FocusError),
    #[error(transparent)]
    IntersectionComputeFailed(FocusError),
    #[error(transparent)]
    InvalidCalibration(FocusError),
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[cfg(feature = "image")]
    #[error(transparent)]
    Decode(#[from] ::image::ImageError),
}

impl AnalyzeError {
    pub fn kind(&self) -> FrameErrorKind {
        match self {
            AnalyzeError::InvalidFrame(_) => FrameErrorKind::InvalidFrame,
            AnalyzeError::InvalidParams(_) => FrameErrorKind::InvalidParams,
            AnalyzeError::LinesNotDetected(_) => FrameErrorKind::LinesNotDetected,
            AnalyzeError::IntersectionComputeFailed(_) => {
                FrameErrorKind::IntersectionComputeFailed
            }
            AnalyzeError::InvalidCalibration(_) => FrameErrorKind::InvalidCalibration,
            AnalyzeError::Cancelled(_) => FrameErrorKind::Cancelled,
            AnalyzeError::Io(_) => FrameErrorKind::Io,
            #[cfg(feature = "image")]
            AnalyzeError::Decode(_) => FrameErrorKind::Io,
        }
    }
}

impl From<LineDetectError> for AnalyzeError {
    fn from(err: LineDetectError) -> Self {
        match err {
            LineDetectError::Cancelled(c) => AnalyzeError::Cancelled(c),
            LineDetectError::InvalidParams(msg) => AnalyzeError::InvalidParams(msg),
            other => AnalyzeError::InvalidFrame(other),
        }
    }
}

impl From<ImageError> for AnalyzeError {
    fn from(err: ImageError) -> Self {
        AnalyzeError::InvalidFrame(LineDetectError::Image(err))
    }
}

impl From<FocusError> for AnalyzeError {
    fn from(err: FocusError) -> Self {
        match err {
            FocusError::LinesNotDetected { .. } => AnalyzeError::LinesNotDetected(err),
            FocusError::IntersectionComputeFailed { .. } => {
                AnalyzeError::IntersectionComputeFailed(err)
            }
            FocusError::InvalidCalibration(_) => AnalyzeError::InvalidCalibration(err),
            FocusError::WrongLineCount { .. } => AnalyzeError::InvalidParams(err.to_string()),
        }
    }
}

/// Detector and optics settings for a [`FocusAnalyzer`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusAnalyzerParams {
    pub detector: LineDetectorParams,
    pub optics: OpticsCalibration,
}

impl FocusAnalyzerParams {
    pub fn new(optics: OpticsCalibration) -> Self {
        Self {
            detector: LineDetectorParams::default(),
            optics,
        }
    }
}

/// Result of analyzing one frame (or one channel of it).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FocusAnalysis {
    /// Brightness source the lines were detected in.
    pub intensity: IntensityMode,
    /// Lines in detection rank.
    pub lines: BahtinovLineSet,
    pub evaluation: FocusEvaluation,
}

impl FocusAnalysis {
    #[inline]
    pub fn assessment(&self) -> &FocusAssessment {
        &self.evaluation.assessment
    }
}

/// Per-channel outcome of [`FocusAnalyzer::analyze_channels`].
#[derive(Debug)]
pub struct ChannelAnalysis {
    pub channel: IntensityMode,
    pub result: Result<FocusAnalysis, AnalyzeError>,
}

/// Runs the full Bahtinov pipeline on square RGB frames.
///
/// Every call allocates its own buffers, so one analyzer can be shared
/// between threads and frames.
#[derive(Clone, Debug)]
pub struct FocusAnalyzer {
    params: FocusAnalyzerParams,
    detector: LineDetector,
}

impl FocusAnalyzer {
    /// Validate parameters and build the analyzer.
    pub fn new(params: FocusAnalyzerParams) -> Result<Self, AnalyzeError> {
        if params.detector.line_count != BAHTINOV_LINE_COUNT {
            return Err(AnalyzeError::InvalidParams(format!(
                "line_count must be {BAHTINOV_LINE_COUNT} for focus analysis, got {}",
                params.detector.line_count
            )));
        }
        params.optics.validate()?;
        let detector = LineDetector::new(params.detector.clone())?;
        Ok(Self { params, detector })
    }

    #[inline]
    pub fn params(&self) -> &FocusAnalyzerParams {
        &self.params
    }

    /// Analyze one frame with the configured brightness source.
    pub fn analyze(&self, image: &RgbImageView<'_>) -> Result<FocusAnalysis, AnalyzeError> {
        self.analyze_cancellable(image, &CancelFlag::new())
    }

    /// Like [`FocusAnalyzer::analyze`], abandoning the frame as soon as
    /// `cancel` is raised at a stage boundary.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, image, cancel),
            fields(width = image.width(), height = image.height())
        )
    )]
    pub fn analyze_cancellable(
        &self,
        image: &RgbImageView<'_>,
        cancel: &CancelFlag,
    ) -> Result<FocusAnalysis, AnalyzeError> {
        run(&self.detector, &self.params.optics, image, cancel)
    }

    /// Analyze the red, green and blue channels independently.
    ///
    /// A failing channel only fails its own entry.
    pub fn analyze_channels(&self, image: &RgbImageView<'_>) -> Vec<ChannelAnalysis> {
        self.analyze_channels_cancellable(image, &CancelFlag::new())
    }

    pub fn analyze_channels_cancellable(
        &self,
        image: &RgbImageView<'_>,
        cancel: &CancelFlag,
    ) -> Vec<ChannelAnalysis> {
        IntensityMode::CHANNELS
            .iter()
            .map(|&channel| {
                let params = self.params.detector.clone().with_intensity(channel);
                let result = LineDetector::new(params)
                    .map_err(AnalyzeError::from)
                    .and_then(|d| run(&d, &self.params.optics, image, cancel));
                if let Err(err) = &result {
                    info!("{channel:?} channel: {err}");
                }
                ChannelAnalysis { channel, result }
            })
            .collect()
    }
}

fn run(
    detector: &LineDetector,
    optics: &OpticsCalibration,
    image: &RgbImageView<'_>,
    cancel: &CancelFlag,
) -> Result<FocusAnalysis, AnalyzeError> {
    let lines = detector.detect_cancellable(image, cancel)?;
    cancel.check()?;
    let evaluation = evaluate_focus(&lines, optics)?;
    debug!(
        "{:?}: angles {:?} rows {:?}",
        detector.params().intensity,
        lines.angles(),
        lines.rows()
    );
    Ok(FocusAnalysis {
        intensity: detector.params().intensity,
        lines,
        evaluation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_bahtinov_line_count() {
        let mut params = FocusAnalyzerParams::default();
        params.detector.line_count = 4;
        let err = FocusAnalyzer::new(params).unwrap_err();
        assert_eq!(err.kind(), FrameErrorKind::InvalidParams);
    }

    #[test]
    fn rejects_bad_optics() {
        let params = FocusAnalyzerParams::new(OpticsCalibration::new(0.0, 1000.0, 3.8));
        let err = FocusAnalyzer::new(params).unwrap_err();
        assert_eq!(err.kind(), FrameErrorKind::InvalidCalibration);
    }

    #[test]
    fn focus_errors_map_to_frame_kinds() {
        let parallel: AnalyzeError = FocusError::LinesNotDetected { slope: 1.0 }.into();
        assert_eq!(parallel.kind(), FrameErrorKind::LinesNotDetected);
        let nan: AnalyzeError = FocusError::IntersectionComputeFailed { what: "distance" }.into();
        assert_eq!(nan.kind(), FrameErrorKind::IntersectionComputeFailed);
        let rows: AnalyzeError = LineDetectError::RowOutOfBounds {
            index: 0,
            row: -1.0,
            height: 10,
        }
        .into();
        assert_eq!(rows.kind(), FrameErrorKind::InvalidFrame);
        let cancelled: AnalyzeError = LineDetectError::Cancelled(Cancelled).into();
        assert_eq!(cancelled.kind(), FrameErrorKind::Cancelled);
    }
}
