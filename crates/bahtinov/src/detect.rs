//! Helpers for analyzing `image::RgbImage` frames and image files.

use crate::{AnalyzeError, ChannelAnalysis, FocusAnalysis, FocusAnalyzer};
use bahtinov_core::{ImageError, RgbImageView};
use image::RgbImage;
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Square region analyzed out of a larger frame, in source pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub side: u32,
}

impl CropRegion {
    /// Largest square centered in a `width x height` frame.
    pub fn center_square(width: u32, height: u32) -> Self {
        let side = width.min(height);
        Self {
            x: (width - side) / 2,
            y: (height - side) / 2,
            side,
        }
    }
}

/// View an `image::RgbImage` as the core buffer type.
pub fn rgb_view(img: &RgbImage) -> Result<RgbImageView<'_>, ImageError> {
    RgbImageView::packed(img.width() as usize, img.height() as usize, img.as_raw())
}

/// Crop the largest centered square out of `img`.
pub fn crop_center_square(img: &RgbImage) -> (RgbImage, CropRegion) {
    let region = CropRegion::center_square(img.width(), img.height());
    if region.side == img.width() && region.side == img.height() {
        return (img.clone(), region);
    }
    let square = image::imageops::crop_imm(img, region.x, region.y, region.side, region.side)
        .to_image();
    (square, region)
}

/// Build an `image::RgbImage` from a packed RGB buffer.
pub fn rgb_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<RgbImage, AnalyzeError> {
    let (w, h) = (width as usize, height as usize);
    let Some(expected) = w.checked_mul(h).and_then(|n| n.checked_mul(3)) else {
        return Err(ImageError::InvalidDimensions {
            width: w,
            height: h,
        }
        .into());
    };
    if pixels.len() != expected {
        return Err(ImageError::InvalidBuffer {
            expected,
            got: pixels.len(),
        }
        .into());
    }
    RgbImage::from_raw(width, height, pixels.to_vec()).ok_or_else(|| {
        ImageError::InvalidDimensions {
            width: w,
            height: h,
        }
        .into()
    })
}

/// Decode an image file into 8-bit RGB.
pub fn load_rgb(path: impl AsRef<Path>) -> Result<RgbImage, AnalyzeError> {
    Ok(image::open(path)?.to_rgb8())
}

/// Crop the centered square of `img` and analyze it.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(img, analyzer),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn analyze_image(
    img: &RgbImage,
    analyzer: &FocusAnalyzer,
) -> Result<(FocusAnalysis, CropRegion), AnalyzeError> {
    let (square, region) = crop_center_square(img);
    let analysis = analyzer.analyze(&rgb_view(&square)?)?;
    Ok((analysis, region))
}

/// Crop the centered square of `img` and analyze each color channel.
pub fn analyze_image_channels(
    img: &RgbImage,
    analyzer: &FocusAnalyzer,
) -> Result<(Vec<ChannelAnalysis>, CropRegion), AnalyzeError> {
    let (square, region) = crop_center_square(img);
    let channels = analyzer.analyze_channels(&rgb_view(&square)?);
    Ok((channels, region))
}
