//! Decoded image container and pixel matrix.
//!
//! An [`Image`] is a cheap-to-clone handle to an immutable [`Matrix`] of
//! interleaved 8-bit pixels. Operations borrow the matrix read-only, so the
//! same image can feed any number of concurrent operations.

use std::sync::Arc;

use image::{DynamicImage, ExtendedColorType};
use thiserror::Error;

/// Errors that can occur when building a pixel matrix.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * channels), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Exactly one of width or height is zero
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The byte length of the matrix does not fit in memory
    #[error("Image too large: {width}x{height} with {channels} channels")]
    TooLarge {
        width: u32,
        height: u32,
        channels: usize,
    },
}

/// Memory layout of a single pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// One luminance byte per pixel.
    Gray8,
    /// Red, green, blue.
    #[default]
    Rgb8,
    /// Red, green, blue, alpha.
    Rgba8,
}

impl PixelFormat {
    /// Number of bytes per pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }

    /// Pixel format matching a channel count, if there is one.
    pub fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(PixelFormat::Gray8),
            3 => Some(PixelFormat::Rgb8),
            4 => Some(PixelFormat::Rgba8),
            _ => None,
        }
    }

    /// The `image` crate color type for this layout.
    pub fn color_type(self) -> ExtendedColorType {
        match self {
            PixelFormat::Gray8 => ExtendedColorType::L8,
            PixelFormat::Rgb8 => ExtendedColorType::Rgb8,
            PixelFormat::Rgba8 => ExtendedColorType::Rgba8,
        }
    }
}

/// A decoded pixel matrix in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Matrix {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Matrix {
    /// Create a matrix from dimensions and interleaved pixel bytes.
    ///
    /// A `0x0` matrix with no data is accepted and is [empty](Self::is_empty).
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, MatrixError> {
        if (width == 0) != (height == 0) {
            return Err(MatrixError::InvalidDimensions { width, height });
        }

        let expected = byte_len(width, height, format)?;
        if data.len() != expected {
            return Err(MatrixError::InvalidPixelData {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// A matrix with no elements.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create an RGB matrix filled with a single color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self, MatrixError> {
        let len = byte_len(width, height, PixelFormat::Rgb8)?;
        let data = rgb.iter().copied().cycle().take(len).collect();
        Self::new(width, height, PixelFormat::Rgb8, data)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw interleaved pixel bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns true when the matrix holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<DynamicImage> for Matrix {
    fn from(img: DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        let (format, data) = match img {
            DynamicImage::ImageLuma8(buf) => (PixelFormat::Gray8, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (PixelFormat::Rgb8, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (PixelFormat::Rgba8, buf.into_raw()),
            other if other.color().has_alpha() => (PixelFormat::Rgba8, other.into_rgba8().into_raw()),
            other => (PixelFormat::Rgb8, other.into_rgb8().into_raw()),
        };
        Self {
            width,
            height,
            format,
            data,
        }
    }
}

/// Number of bytes needed for a `width x height` matrix, if it fits in `usize`.
fn byte_len(width: u32, height: u32, format: PixelFormat) -> Result<usize, MatrixError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(format.channels()))
        .ok_or(MatrixError::TooLarge {
            width,
            height,
            channels: format.channels(),
        })
}

/// Shared, read-only handle to a decoded image.
#[derive(Debug, Clone, Default)]
pub struct Image {
    matrix: Arc<Matrix>,
}

impl Image {
    pub fn new(matrix: Matrix) -> Self {
        Self {
            matrix: Arc::new(matrix),
        }
    }

    /// Handle to an image with no pixel data.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The underlying pixel matrix.
    #[inline]
    pub fn matrix(&self) -> &Arc<Matrix> {
        &self.matrix
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }
}

impl From<Matrix> for Image {
    fn from(matrix: Matrix) -> Self {
        Self::new(matrix)
    }
}

impl From<DynamicImage> for Image {
    fn from(img: DynamicImage) -> Self {
        Self::new(Matrix::from(img))
    }
}
