//! Encode operation: serialize an image into a file format held in memory.
//!
//! The format is a bare extension (`"jpg"`, `"png"`, ...) and the quality is
//! on a 0-100 scale, where 0 leaves the codec on its default. Quality is
//! translated into the codec parameter each format understands:
//!
//! | format | parameter | value |
//! |---|---|---|
//! | `"jpg"` | [`ImwriteFlag::JpegQuality`] | `quality` |
//! | `"png"` | [`ImwriteFlag::PngCompression`] | `quality * 90 / 1000` |
//! | anything else | [`ImwriteFlag::PngCompression`] | `quality` |
//!
//! The PNG rescale is integer arithmetic, so every quality below 12 lands on
//! compression level 0.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::{Operation, OperationError};
use crate::codec::{Codec, EncodeParams, ImageCodec, ImwriteFlag};
use crate::matrix::{Image, Matrix};
use crate::task::Task;

/// Arguments of an encode call.
#[derive(Clone)]
pub struct EncodeArgs {
    /// Format extension without the leading dot.
    pub format: String,
    /// Quality on a 0-100 scale; 0 means codec default.
    pub quality: u32,
    /// Codec performing the actual serialization.
    pub codec: Arc<dyn Codec>,
}

impl EncodeArgs {
    /// Build arguments for the default codec.
    ///
    /// `quality` is clamped into the `u32` range, so negative values become 0.
    pub fn new(format: impl Into<String>, quality: i64) -> Self {
        Self {
            format: format.into(),
            quality: quality.clamp(0, i64::from(u32::MAX)) as u32,
            codec: Arc::new(ImageCodec),
        }
    }

    /// Use a different codec.
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }
}

impl fmt::Debug for EncodeArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodeArgs")
            .field("format", &self.format)
            .field("quality", &self.quality)
            .finish_non_exhaustive()
    }
}

/// Build the codec parameter list for a format and quality.
pub fn encode_params(format: &str, quality: u32) -> EncodeParams {
    let mut params = EncodeParams::new();
    if quality > 0 {
        let flag = if format == "jpg" {
            ImwriteFlag::JpegQuality
        } else {
            ImwriteFlag::PngCompression
        };

        // 0-100 quality onto the 0-9 compression range.
        let value = if format == "png" {
            (u64::from(quality) * 90 / 1000) as u32
        } else {
            quality
        };

        params.push(flag, value);
    }
    params
}

/// An in-flight encode.
pub struct Encode {
    matrix: Arc<Matrix>,
    codec: Arc<dyn Codec>,
    format: String,
    quality: u32,
    buffer: Vec<u8>,
}

impl Operation for Encode {
    const NAME: &'static str = "encode";

    type Args = EncodeArgs;
    type Value = Vec<u8>;

    fn prepare(image: &Image, args: EncodeArgs) -> Result<Self, OperationError> {
        if image.is_empty() {
            return Err(OperationError::EmptyImage);
        }

        Ok(Self {
            matrix: Arc::clone(image.matrix()),
            codec: args.codec,
            format: args.format,
            quality: args.quality,
            buffer: Vec::new(),
        })
    }

    fn process(&mut self) -> Result<(), OperationError> {
        let params = encode_params(&self.format, self.quality);
        let ext = format!(".{}", self.format);
        debug!(ext = %ext, params = ?params, "encoding");

        let (codec, matrix) = (&self.codec, &self.matrix);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| codec.encode(&ext, matrix, &params)));

        self.buffer = match outcome {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                debug!(error = %e, "codec rejected input");
                Vec::new()
            }
            Err(payload) => {
                warn!(reason = panic_message(payload.as_ref()), "codec panicked");
                Vec::new()
            }
        };

        if self.buffer.is_empty() {
            return Err(OperationError::process(Self::NAME));
        }

        debug!(bytes = self.buffer.len(), "encoded");
        Ok(())
    }

    fn value(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    fn cleanup(&mut self) {
        trace!(leftover = self.buffer.len(), "encode cleanup");
        self.buffer = Vec::new();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown"
    }
}

impl Image {
    /// Prepare an encode of this image with the default codec.
    ///
    /// Fails immediately with [`OperationError::EmptyImage`] if the image has
    /// no pixel data.
    pub fn encode(
        &self,
        format: impl Into<String>,
        quality: i64,
    ) -> Result<Task<Encode>, OperationError> {
        Task::prepare(self, EncodeArgs::new(format, quality))
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
