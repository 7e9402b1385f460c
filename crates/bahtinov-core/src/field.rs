//! Single-channel brightness field used by the line scanner.
//!
//! The field stores `sqrt((R + G + B) * 3 / 255)` for every pixel of the
//! frame. The square root compresses the dynamic range so a saturated star
//! core does not drown the much dimmer diffraction spikes.
//!
//! Only the inscribed [`ScanBox`] is scanned, but rotated box pixels land
//! outside the box, so the field is evaluated over the whole frame.

use crate::image::{ImageError, RgbImageView};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Default safety margin (pixels) subtracted from the inscribed square side.
pub const DEFAULT_BOX_MARGIN_PX: f64 = 8.0;

/// Which color information feeds the brightness field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityMode {
    /// Sum of all three channels.
    #[default]
    Luminance,
    Red,
    Green,
    Blue,
}

impl IntensityMode {
    /// The three single-channel modes, in RGB order.
    pub const CHANNELS: [IntensityMode; 3] =
        [IntensityMode::Red, IntensityMode::Green, IntensityMode::Blue];

    /// Combined channel sum in `0..=765` for one RGB pixel.
    ///
    /// Single channels are scaled by 3 so every mode shares the same range.
    #[inline]
    fn channel_sum(self, px: &[u8]) -> usize {
        match self {
            IntensityMode::Luminance => px[0] as usize + px[1] as usize + px[2] as usize,
            IntensityMode::Red => 3 * px[0] as usize,
            IntensityMode::Green => 3 * px[1] as usize,
            IntensityMode::Blue => 3 * px[2] as usize,
        }
    }
}

/// Square region centered on the frame whose rotations stay inside the image.
///
/// `right` and `bottom` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanBox {
    pub left: usize,
    pub right: usize,
    pub top: usize,
    pub bottom: usize,
}

impl ScanBox {
    /// Inscribed square for a `width x height` frame.
    ///
    /// Side is `floor(0.5 * sqrt(2) * min(width, height) - margin)`, so the
    /// box rotated by any angle about the frame center stays at least
    /// `margin / sqrt(2)` pixels away from the image border.
    pub fn inscribed(width: usize, height: usize, margin: f64) -> Result<Self, ImageError> {
        let edge = 0.5 * std::f64::consts::SQRT_2 * width.min(height) as f64 - margin;
        if !edge.is_finite() || edge < 1.0 {
            return Err(ImageError::EmptyScanBox { width, height });
        }
        let side = edge.floor() as usize;
        let left = (width - side) / 2;
        let top = (height - side) / 2;
        Ok(Self {
            left,
            right: left + side,
            top,
            bottom: top + side,
        })
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.right - self.left
    }

    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.top..self.bottom
    }

    #[inline]
    pub fn cols(&self) -> Range<usize> {
        self.left..self.right
    }
}

/// Brightness field of one frame. Immutable once built.
#[derive(Clone, Debug)]
pub struct IntensityField {
    width: usize,
    height: usize,
    data: Vec<f32>,
    scan_box: ScanBox,
}

impl IntensityField {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn scan_box(&self) -> ScanBox {
        self.scan_box
    }

    /// Rotation center: the center of the full frame, not of the box.
    #[inline]
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Raw field value, or `None` outside the frame.
    #[inline]
    pub fn value(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    #[inline]
    fn get(&self, x: i64, y: i64) -> f32 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0.0;
        }
        self.data[y as usize * self.width + x as usize]
    }

    /// Bilinear interpolation over the 4 integer neighbours of `(x, y)`.
    ///
    /// Neighbours outside the frame contribute zero.
    #[inline]
    pub fn sample_bilinear(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let p00 = self.get(x0, y0) as f64;
        let p10 = self.get(x0 + 1, y0) as f64;
        let p01 = self.get(x0, y0 + 1) as f64;
        let p11 = self.get(x0 + 1, y0 + 1) as f64;

        let a = p00 + fx * (p10 - p00);
        let b = p01 + fx * (p11 - p01);
        a + fy * (b - a)
    }
}

/// Brightness lookup indexed by channel sum (`0..=765`).
fn brightness_lut() -> [f32; 766] {
    let mut lut = [0.0f32; 766];
    for (sum, v) in lut.iter_mut().enumerate() {
        *v = ((sum as f64) * 3.0 / 255.0).sqrt() as f32;
    }
    lut
}

/// Build the brightness field of a frame and its inscribed scan box.
///
/// `margin` is the pixel margin subtracted from the inscribed square side
/// (see [`ScanBox::inscribed`]); [`DEFAULT_BOX_MARGIN_PX`] is the usual value.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(image),
        fields(width = image.width(), height = image.height())
    )
)]
pub fn build_intensity_field(
    image: &RgbImageView<'_>,
    mode: IntensityMode,
    margin: f64,
) -> Result<IntensityField, ImageError> {
    let (width, height) = (image.width(), image.height());
    let scan_box = ScanBox::inscribed(width, height, margin)?;
    let lut = brightness_lut();

    let mut data = vec![0.0f32; width * height];
    for (y, out_row) in data.chunks_exact_mut(width).enumerate() {
        let Some(row) = image.row(y) else {
            continue;
        };
        for (out, px) in out_row.iter_mut().zip(row.chunks_exact(3)) {
            *out = lut[mode.channel_sum(px)];
        }
    }

    Ok(IntensityField {
        width,
        height,
        data,
        scan_box,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn inscribed_box_is_square_and_centered() {
        let b = ScanBox::inscribed(200, 200, DEFAULT_BOX_MARGIN_PX).expect("box");
        // 0.5 * sqrt(2) * 200 - 8 = 133.42
        assert_eq!(b.side(), 133);
        assert_eq!(b.bottom - b.top, 133);
        assert_eq!(b.left, 33);
        assert_eq!(b.top, 33);
    }

    #[test]
    fn rotated_box_corners_stay_inside_frame() {
        for &(w, h) in &[(64usize, 64usize), (101, 101), (320, 240)] {
            let b = ScanBox::inscribed(w, h, DEFAULT_BOX_MARGIN_PX).expect("box");
            let (cx, cy) = (w as f64 / 2.0, h as f64 / 2.0);
            for deg in 0..180 {
                let (s, c) = (deg as f64).to_radians().sin_cos();
                for &(u, v) in &[
                    (b.left, b.top),
                    (b.right - 1, b.top),
                    (b.left, b.bottom - 1),
                    (b.right - 1, b.bottom - 1),
                ] {
                    let (dx, dy) = (u as f64 - cx, v as f64 - cy);
                    let x = cx + dx * c + dy * s;
                    let y = cy + dx * s - dy * c;
                    assert!(x >= 0.0 && x < (w - 1) as f64, "x={x} for {w}x{h}");
                    assert!(y >= 0.0 && y < (h - 1) as f64, "y={y} for {w}x{h}");
                }
            }
        }
    }

    #[test]
    fn tiny_frame_has_no_scan_box() {
        assert_eq!(
            ScanBox::inscribed(10, 10, DEFAULT_BOX_MARGIN_PX),
            Err(ImageError::EmptyScanBox {
                width: 10,
                height: 10
            })
        );
    }

    #[test]
    fn brightness_uses_square_root_of_scaled_sum() {
        let mut data = vec![0u8; 3 * 32 * 32];
        data[0..3].copy_from_slice(&[255, 255, 255]);
        data[3..6].copy_from_slice(&[10, 20, 30]);
        let view = RgbImageView::packed(32, 32, &data).expect("view");

        let field = build_intensity_field(&view, IntensityMode::Luminance, 8.0).expect("field");
        assert_relative_eq!(field.value(0, 0).unwrap(), 3.0, epsilon = 1e-6);
        let expected = (60.0f64 * 3.0 / 255.0).sqrt() as f32;
        assert_relative_eq!(field.value(1, 0).unwrap(), expected, epsilon = 1e-6);

        let red = build_intensity_field(&view, IntensityMode::Red, 8.0).expect("field");
        let expected = (10.0f64 * 9.0 / 255.0).sqrt() as f32;
        assert_relative_eq!(red.value(1, 0).unwrap(), expected, epsilon = 1e-6);
    }

    #[test]
    fn bilinear_interpolates_between_neighbours() {
        let mut data = vec![0u8; 3 * 32 * 32];
        // pixel (5, 5) bright, everything else black
        let i = 3 * (5 * 32 + 5);
        data[i..i + 3].copy_from_slice(&[255, 255, 255]);
        let view = RgbImageView::packed(32, 32, &data).expect("view");
        let field = build_intensity_field(&view, IntensityMode::Luminance, 8.0).expect("field");

        assert_relative_eq!(field.sample_bilinear(5.0, 5.0), 3.0, epsilon = 1e-9);
        assert_relative_eq!(field.sample_bilinear(4.5, 5.0), 1.5, epsilon = 1e-9);
        assert_relative_eq!(field.sample_bilinear(5.5, 5.5), 0.75, epsilon = 1e-9);
        assert_eq!(field.sample_bilinear(-3.0, 40.0), 0.0);
    }
}
