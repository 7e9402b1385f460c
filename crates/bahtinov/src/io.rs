//! JSON configuration and report helpers for the CLI and batch tools.

use crate::{AnalyzeError, FocusAnalysis, FocusAnalyzer, FocusAnalyzerParams, FrameErrorKind};
use bahtinov_core::IntensityMode;
use bahtinov_focus::{FocusEvaluation, OpticsCalibration};
use bahtinov_lines::{BahtinovLineSet, LineDetectorParams};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum FocusIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration for analyzing one image file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusAnalyzeConfig {
    pub image_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    pub optics: OpticsCalibration,
    #[serde(default)]
    pub detector: Option<LineDetectorParams>,
    /// Analyze red, green and blue separately instead of the channel sum.
    #[serde(default)]
    pub channels: bool,
}

impl FocusAnalyzeConfig {
    pub fn new(image_path: impl Into<String>, optics: OpticsCalibration) -> Self {
        Self {
            image_path: image_path.into(),
            output_path: None,
            optics,
            detector: None,
            channels: false,
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, FocusIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), FocusIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("bahtinov_report.json"))
    }

    /// Analyzer parameters, applying the detector override if present.
    pub fn build_params(&self) -> FocusAnalyzerParams {
        FocusAnalyzerParams {
            detector: self.detector.clone().unwrap_or_default(),
            optics: self.optics,
        }
    }

    pub fn build_analyzer(&self) -> Result<FocusAnalyzer, AnalyzeError> {
        FocusAnalyzer::new(self.build_params())
    }
}

/// Outcome for one brightness source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelReport {
    pub channel: IntensityMode,
    #[serde(default)]
    pub lines: Option<BahtinovLineSet>,
    #[serde(default)]
    pub evaluation: Option<FocusEvaluation>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_kind: Option<FrameErrorKind>,
}

impl ChannelReport {
    pub fn from_result(
        channel: IntensityMode,
        result: &Result<FocusAnalysis, AnalyzeError>,
    ) -> Self {
        match result {
            Ok(analysis) => Self {
                channel,
                lines: Some(analysis.lines.clone()),
                evaluation: Some(analysis.evaluation.clone()),
                error: None,
                error_kind: None,
            },
            Err(err) => Self {
                channel,
                lines: None,
                evaluation: None,
                error: Some(err.to_string()),
                error_kind: Some(err.kind()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusReport {
    pub image_path: String,
    pub image_width: u32,
    pub image_height: u32,
    /// Square region of the image that was analyzed: `[x, y, side]`.
    #[serde(default)]
    pub crop: Option<[u32; 3]>,
    pub optics: OpticsCalibration,
    pub channels: Vec<ChannelReport>,
}

impl FocusReport {
    pub fn new(
        image_path: impl Into<String>,
        image_width: u32,
        image_height: u32,
        optics: OpticsCalibration,
    ) -> Self {
        Self {
            image_path: image_path.into(),
            image_width,
            image_height,
            crop: None,
            optics,
            channels: Vec::new(),
        }
    }

    /// Record the outcome for one brightness source.
    pub fn push_result(
        &mut self,
        channel: IntensityMode,
        result: &Result<FocusAnalysis, AnalyzeError>,
    ) {
        self.channels.push(ChannelReport::from_result(channel, result));
    }

    /// Number of channels that produced an assessment.
    pub fn success_count(&self) -> usize {
        self.channels
            .iter()
            .filter(|c| c.evaluation.is_some())
            .count()
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, FocusIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), FocusIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
