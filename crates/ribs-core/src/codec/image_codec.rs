//! Default codec backed by the `image` crate encoders.
//!
//! Supported extensions (case-insensitive): `.jpg`, `.jpeg`, `.jpe` and `.png`.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};

use super::{Codec, CodecError, EncodeParams, ImwriteFlag};
use crate::matrix::{Matrix, PixelFormat};

/// JPEG quality used when no quality parameter is given.
const DEFAULT_JPEG_QUALITY: u32 = 95;

/// Highest PNG compression level accepted.
const MAX_PNG_COMPRESSION: u32 = 9;

/// Codec using the `image` crate's JPEG and PNG encoders.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl Codec for ImageCodec {
    /// # Panics
    ///
    /// Panics if `matrix` is empty.
    fn encode(
        &self,
        ext: &str,
        matrix: &Matrix,
        params: &EncodeParams,
    ) -> Result<Vec<u8>, CodecError> {
        assert!(!matrix.is_empty(), "cannot encode an empty matrix");

        let name = ext.strip_prefix('.').unwrap_or(ext).to_ascii_lowercase();
        match name.as_str() {
            "jpg" | "jpeg" | "jpe" => encode_jpeg(matrix, params),
            "png" => encode_png(matrix, params),
            _ => Err(CodecError::UnsupportedExtension(ext.to_string())),
        }
    }
}

/// Encode to JPEG. Quality is clamped to 1-100 and alpha is dropped.
fn encode_jpeg(matrix: &Matrix, params: &EncodeParams) -> Result<Vec<u8>, CodecError> {
    let quality = params
        .get(ImwriteFlag::JpegQuality)
        .unwrap_or(DEFAULT_JPEG_QUALITY)
        .clamp(1, 100) as u8;

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    let written = match matrix.format() {
        PixelFormat::Rgba8 => {
            let rgb: Vec<u8> = matrix
                .data()
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            encoder.write_image(&rgb, matrix.width(), matrix.height(), ExtendedColorType::Rgb8)
        }
        format => encoder.write_image(
            matrix.data(),
            matrix.width(),
            matrix.height(),
            format.color_type(),
        ),
    };
    written.map_err(|e| CodecError::Encoding(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Encode to PNG, mapping the 0-9 compression level onto the encoder presets.
fn encode_png(matrix: &Matrix, params: &EncodeParams) -> Result<Vec<u8>, CodecError> {
    let compression = match params.get(ImwriteFlag::PngCompression) {
        None => CompressionType::Default,
        Some(level) => match level.min(MAX_PNG_COMPRESSION) {
            0..=3 => CompressionType::Fast,
            4..=6 => CompressionType::Default,
            _ => CompressionType::Best,
        },
    };

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new_with_quality(&mut buffer, compression, FilterType::Adaptive)
        .write_image(
            matrix.data(),
            matrix.width(),
            matrix.height(),
            matrix.format().color_type(),
        )
        .map_err(|e| CodecError::Encoding(e.to_string()))?;

    Ok(buffer.into_inner())
}
