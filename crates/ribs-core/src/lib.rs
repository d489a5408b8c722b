//! ribs core - staged image operations
//!
//! This crate runs image operations through a fixed four-phase life cycle
//! (prepare, process, value, cleanup) so a potentially panicking codec call
//! can run off the caller's thread and still report a plain error.
//!
//! # Module Structure
//!
//! - `matrix` - the decoded image container
//! - `codec` - the encoder seam and the default `image`-crate codec
//! - `operation` - the operation contract and the encode operation
//! - `task` - phase ordering and the cleanup guarantee
//! - `scheduler` - callback-style scheduling on an owned runtime
//! - `config` - scheduler configuration
//! - `logging` - `tracing` subscriber setup
//!
//! # Usage
//!
//! ```ignore
//! use ribs_core::{Image, Matrix};
//!
//! let image = Image::new(Matrix::filled(2, 2, [255, 255, 255])?);
//! let png = image.encode("png", 0)?.run().await?;
//! ```

pub mod codec;
pub mod matrix;
pub mod operation;
pub mod task;

#[cfg(feature = "runtime")]
pub mod config;
#[cfg(feature = "runtime")]
pub mod logging;
#[cfg(feature = "runtime")]
pub mod scheduler;

pub use codec::{Codec, CodecError, EncodeParams, ImageCodec, ImwriteFlag};
pub use matrix::{Image, Matrix, MatrixError, PixelFormat};
pub use operation::{Encode, EncodeArgs, Operation, OperationError};
pub use task::Task;

#[cfg(feature = "runtime")]
pub use config::{ConfigError, SchedulerConfig};
#[cfg(feature = "runtime")]
pub use scheduler::Scheduler;

/// Get the version of the core library
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
