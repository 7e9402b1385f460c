//! Bahtinov line detection pipeline.
//!
//! This module wires together the brightness field, the coarse rotational
//! scan, angular suppression, and subpixel row refinement.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::LineDetectError;
pub use params::LineDetectorParams;
pub use pipeline::LineDetector;
pub use result::{BahtinovLineSet, LineCandidate};
