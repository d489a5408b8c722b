//! Image handle exposed to JavaScript.

use ribs_core::{Encode, EncodeArgs, Image, OperationError, Task};
use wasm_bindgen::prelude::*;

use crate::types::{format_from_js, matrix_from_parts, quality_from_f64};

/// A decoded image held in WASM memory.
///
/// Encoding borrows the pixels read-only, so one image can be encoded any
/// number of times.
#[wasm_bindgen]
pub struct JsImage {
    inner: Image,
}

#[wasm_bindgen]
impl JsImage {
    /// Create an image from dimensions and interleaved pixel data.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `channels` - Bytes per pixel: 1 (gray), 3 (RGB) or 4 (RGBA)
    /// * `pixels` - Row-major pixel data
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Result<JsImage, JsValue> {
        let matrix = matrix_from_parts(width, height, channels, pixels).map_err(|e| to_js_error(&e))?;
        Ok(JsImage {
            inner: Image::new(matrix),
        })
    }

    /// An image with no pixel data.
    pub fn empty() -> JsImage {
        JsImage {
            inner: Image::empty(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.matrix().width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.matrix().height()
    }

    #[wasm_bindgen(getter)]
    pub fn channels(&self) -> u8 {
        self.inner.matrix().format().channels() as u8
    }

    #[wasm_bindgen(getter, js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Encode the image into an in-memory file.
    ///
    /// # Arguments
    /// * `format` - File extension without the dot, e.g. `"png"` or `"jpg"`
    /// * `quality` - 0 to 100; 0 keeps the codec default
    ///
    /// # Errors
    ///
    /// Throws `Error("empty image")` if the image has no pixels and
    /// `Error("operation error: encode")` if encoding produced nothing.
    pub fn encode(&self, format: JsValue, quality: f64) -> Result<Vec<u8>, JsValue> {
        self.encode_with(format_from_js(&format), quality)
            .map_err(|e| to_js_error(&e.to_string()))
    }
}

impl JsImage {
    /// Encode without touching JavaScript values, so it can be tested natively.
    ///
    /// There is no blocking pool on wasm32, so the operation runs inline.
    pub(crate) fn encode_with(&self, format: String, quality: f64) -> Result<Vec<u8>, OperationError> {
        let args = EncodeArgs::new(format, quality_from_f64(quality));
        Task::<Encode>::prepare(&self.inner, args)?.run_inline()
    }
}

fn to_js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white() -> JsImage {
        JsImage {
            inner: Image::new(ribs_core::Matrix::filled(2, 2, [255, 255, 255]).unwrap()),
        }
    }

    #[test]
    fn test_getters() {
        let img = white();
        assert_eq!(img.width(), 2);
        assert_eq!(img.height(), 2);
        assert_eq!(img.channels(), 3);
        assert!(!img.is_empty());
        assert!(JsImage::empty().is_empty());
    }

    #[test]
    fn test_encode_png() {
        let bytes = white().encode_with("png".to_string(), 0.0).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().into_rgb8();
        assert_eq!(decoded.dimensions(), (2, 2));
    }

    #[test]
    fn test_encode_fractional_quality() {
        let bytes = white().encode_with("jpg".to_string(), 80.6).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_empty_image() {
        let result = JsImage::empty().encode_with("jpg".to_string(), 50.0);
        assert_eq!(result, Err(OperationError::EmptyImage));
    }

    #[test]
    fn test_encode_bogus_format() {
        let result = white().encode_with("bogus".to_string(), 0.0);
        assert_eq!(result.unwrap_err().to_string(), "operation error: encode");
    }
}
