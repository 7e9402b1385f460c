/// Errors raised when a frame buffer cannot be analyzed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("row stride {stride} is shorter than one row of {width} RGB pixels")]
    InvalidStride { width: usize, stride: usize },

    #[error("invalid RGB buffer length (expected at least {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("scan box is empty for a {width}x{height} frame")]
    EmptyScanBox { width: usize, height: usize },
}

/// Bounds-checked view over a packed 8-bit RGB buffer.
///
/// Rows are `stride` bytes apart; each pixel occupies 3 bytes (R, G, B).
/// Padding bytes at the end of a row are ignored.
#[derive(Clone, Copy, Debug)]
pub struct RgbImageView<'a> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a [u8],
}

impl<'a> RgbImageView<'a> {
    /// Wrap a buffer, validating that every row fits inside `data`.
    pub fn new(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a [u8],
    ) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions { width, height });
        }
        let row_bytes = width
            .checked_mul(3)
            .ok_or(ImageError::InvalidDimensions { width, height })?;
        if stride < row_bytes {
            return Err(ImageError::InvalidStride { width, stride });
        }
        let expected = stride
            .checked_mul(height - 1)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or(ImageError::InvalidDimensions { width, height })?;
        if data.len() < expected {
            return Err(ImageError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    /// Wrap a tightly packed buffer (`stride == 3 * width`).
    pub fn packed(width: usize, height: usize, data: &'a [u8]) -> Result<Self, ImageError> {
        Self::new(width, height, width.saturating_mul(3), data)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// RGB triple at `(x, y)`, or `None` outside the image.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = y * self.stride + 3 * x;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// The `3 * width` pixel bytes of row `y` (padding excluded).
    #[inline]
    pub fn row(&self, y: usize) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.data.get(start..start + 3 * self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_buffers_and_strides() {
        let data = vec![0u8; 3 * 4 * 4];
        assert_eq!(
            RgbImageView::new(4, 4, 11, &data).unwrap_err(),
            ImageError::InvalidStride {
                width: 4,
                stride: 11
            }
        );
        assert_eq!(
            RgbImageView::new(4, 5, 12, &data).unwrap_err(),
            ImageError::InvalidBuffer {
                expected: 60,
                got: 48
            }
        );
        assert!(RgbImageView::new(0, 4, 12, &data).is_err());
    }

    #[test]
    fn padded_stride_addresses_pixels() {
        // 2x2 image, stride 8 (2 bytes of padding per row), last row unpadded.
        let data = [1, 2, 3, 4, 5, 6, 0, 0, 7, 8, 9, 10, 11, 12];
        let view = RgbImageView::new(2, 2, 8, &data).expect("view");
        assert_eq!(view.pixel(0, 0), Some([1, 2, 3]));
        assert_eq!(view.pixel(1, 1), Some([10, 11, 12]));
        assert_eq!(view.pixel(2, 0), None);
        assert_eq!(view.row(1), Some(&data[8..14]));
    }
}
