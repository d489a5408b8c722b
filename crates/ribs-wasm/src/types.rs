//! Conversion of JavaScript argument values into core types.
//!
//! Quality follows `Math.trunc` and the format goes through JavaScript's own
//! `String()`, so `image.encode(404, 90.7)` behaves the way a script author
//! expects.

use ribs_core::{Matrix, PixelFormat};
use wasm_bindgen::prelude::*;

/// Coerce a JavaScript number into a quality value.
///
/// Fractions are truncated and NaN becomes 0. Out-of-range values saturate;
/// the encode operation then clamps them to its own range.
pub(crate) fn quality_from_f64(value: f64) -> i64 {
    if value.is_nan() {
        0
    } else {
        value as i64
    }
}

#[wasm_bindgen]
extern "C" {
    /// The global `String` function.
    #[wasm_bindgen(js_name = String)]
    fn js_string(value: &JsValue) -> String;
}

/// Coerce an arbitrary JavaScript value into a format string with
/// `String(value)`.
///
/// Only calls into JavaScript for non-string values, so plain strings also
/// work off wasm32.
pub(crate) fn format_from_js(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| js_string(value))
}

/// Build a pixel matrix from constructor arguments.
pub(crate) fn matrix_from_parts(
    width: u32,
    height: u32,
    channels: u8,
    pixels: Vec<u8>,
) -> Result<Matrix, String> {
    let format = PixelFormat::from_channels(channels)
        .ok_or_else(|| format!("Invalid channel count: {channels} (expected 1, 3 or 4)"))?;
    Matrix::new(width, height, format, pixels).map_err(|e| e.to_string())
}
