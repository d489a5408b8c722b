//! ribs WASM - WebAssembly bindings for ribs
//!
//! This crate exposes the ribs-core operations to JavaScript/TypeScript
//! applications.
//!
//! # Module Structure
//!
//! - `js_image` - the `JsImage` handle and its `encode` operation
//! - `types` - coercion of JavaScript argument values
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsImage } from '@ribs/wasm';
//!
//! await init();
//!
//! const image = new JsImage(2, 2, 3, new Uint8Array(12).fill(255));
//! const png = image.encode('png', 0);
//! ```

use wasm_bindgen::prelude::*;

mod js_image;
mod types;

pub use js_image::JsImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    ribs_core::version().to_string()
}
