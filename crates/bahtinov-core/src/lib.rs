//! Core types and utilities for Bahtinov mask focus analysis.
//!
//! This crate is intentionally small: a bounds-checked RGB buffer view, the
//! brightness field the line scanner samples, the subpixel peak fitter, a
//! cooperative cancellation flag, and logging setup. It knows nothing about
//! lines or focus geometry.

mod cancel;
mod field;
mod image;
mod logger;
mod peak;
#[cfg(feature = "synthetic")]
pub mod synthetic;

pub use cancel::{CancelFlag, Cancelled};
pub use field::{
    build_intensity_field, IntensityField, IntensityMode, ScanBox, DEFAULT_BOX_MARGIN_PX,
};
pub use image::{ImageError, RgbImageView};
pub use peak::{fit_peak_quadratic, PeakFit, PeakFitFallback, PeakFitKind};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_verbosity, init_with_level, level_from_verbosity};
