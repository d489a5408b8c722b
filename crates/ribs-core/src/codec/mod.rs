//! Codec seam used by encode operations.
//!
//! A [`Codec`] serializes a pixel matrix into the byte representation of a
//! file format chosen by extension (`".png"`, `".jpg"`, ...). Implementations
//! are allowed to panic on input they cannot handle; callers are expected to
//! contain that and to treat an empty output as failure.
//!
//! # Parameters
//!
//! Encoder options travel as an ordered list of [`ImwriteFlag`] / value pairs.
//! A codec reads the flags it understands and ignores the rest.

mod image_codec;

pub use image_codec::ImageCodec;

use thiserror::Error;

use crate::matrix::Matrix;

/// Errors a codec can report through its return channel.
#[derive(Debug, Error)]
pub enum CodecError {
    /// No encoder is registered for the extension
    #[error("Unsupported extension: {0:?}")]
    UnsupportedExtension(String),

    /// The underlying encoder failed
    #[error("Encoding failed: {0}")]
    Encoding(String),
}

/// Encoder parameter keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImwriteFlag {
    /// JPEG quality, 0 to 100 (higher is better).
    JpegQuality,
    /// PNG compression level, 0 to 9 (higher is smaller and slower).
    PngCompression,
}

/// Ordered encoder parameter list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeParams {
    entries: Vec<(ImwriteFlag, u32)>,
}

impl EncodeParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a key followed by its value.
    pub fn push(&mut self, flag: ImwriteFlag, value: u32) {
        self.entries.push((flag, value));
    }

    /// Value for `flag`. When a key appears more than once the last one wins.
    pub fn get(&self, flag: ImwriteFlag) -> Option<u32> {
        self.entries
            .iter()
            .rev()
            .find(|(f, _)| *f == flag)
            .map(|(_, v)| *v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ImwriteFlag, u32)> + '_ {
        self.entries.iter().copied()
    }
}

/// A routine that serializes a pixel matrix for a given file extension.
///
/// `ext` includes the leading dot. Implementations may panic instead of
/// returning an error.
pub trait Codec: Send + Sync {
    fn encode(&self, ext: &str, matrix: &Matrix, params: &EncodeParams)
        -> Result<Vec<u8>, CodecError>;
}
