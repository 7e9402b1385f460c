//! Telescope focus analysis with a Bahtinov mask.
//!
//! A Bahtinov mask turns a star into three diffraction spikes. The middle
//! spike passes through the crossing of the outer two exactly at focus, and
//! its offset measures the focus error. This crate ties the workspace
//! together:
//! - re-exports of the core, line detection and focus geometry crates
//! - [`FocusAnalyzer`]: RGB frame in, [`FocusAnalysis`] out, with cooperative
//!   cancellation and per-channel analysis
//! - [`io`]: JSON config and report files
//! - `detect` (feature `image`): helpers over `image::RgbImage`
//!
//! ## Quickstart
//!
//! ```no_run
//! use bahtinov::{detect, FocusAnalyzer, FocusAnalyzerParams, OpticsCalibration};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = detect::load_rgb("star.png")?;
//! let optics = OpticsCalibration::new(200.0, 1000.0, 3.8);
//! let analyzer = FocusAnalyzer::new(FocusAnalyzerParams::new(optics))?;
//!
//! let (analysis, _crop) = detect::analyze_image(&img, &analyzer)?;
//! let a = analysis.assessment();
//! println!("{:+.2} px, {:.1} um", a.signed_error_px, a.error_microns);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `bahtinov::core`: RGB view, brightness field, peak fitter, cancellation, logging.
//! - `bahtinov::lines`: rotational line scan and subpixel refinement.
//! - `bahtinov::focus`: intersection geometry, microns and critical focus.

mod analyze;
pub mod io;

#[cfg(feature = "image")]
pub mod detect;

pub use bahtinov_core as core;
pub use bahtinov_focus as focus;
pub use bahtinov_lines as lines;

pub use analyze::{
    AnalyzeError, ChannelAnalysis, FocusAnalysis, FocusAnalyzer, FocusAnalyzerParams,
    FrameErrorKind,
};
pub use bahtinov_core::{CancelFlag, IntensityMode, RgbImageView};
pub use bahtinov_focus::{FocusAssessment, FocusEvaluation, GeometricLine, OpticsCalibration};
pub use bahtinov_lines::{BahtinovLineSet, LineCandidate, LineDetectorParams};
