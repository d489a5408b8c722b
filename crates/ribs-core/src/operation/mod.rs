//! Staged image operations.
//!
//! Every operation goes through the same life cycle:
//!
//! 1. **prepare** - validate the image and arguments on the caller's side
//! 2. **process** - do the work, possibly on a worker thread
//! 3. **value** - turn the processed state into the caller's result
//! 4. **cleanup** - release anything not handed to the caller
//!
//! The ordering and the cleanup guarantee are enforced by [`Task`](crate::task::Task),
//! not by the operations themselves.

mod encode;

pub use encode::{encode_params, Encode, EncodeArgs};

use thiserror::Error;

use crate::matrix::Image;

/// Errors surfaced to the caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The source image has no pixel data. Raised by prepare.
    #[error("empty image")]
    EmptyImage,

    /// The process phase produced nothing. All underlying causes collapse
    /// into this one kind.
    #[error("operation error: {operation}")]
    Process { operation: &'static str },
}

impl OperationError {
    /// Process failure for the named operation.
    pub fn process(operation: &'static str) -> Self {
        Self::Process { operation }
    }
}

/// The four-phase contract implemented by every operation.
///
/// `process` only sees what `prepare` captured and must not reach back into
/// caller-owned state: it may run on another thread.
pub trait Operation: Sized + Send + 'static {
    /// Short name, used in process error messages.
    const NAME: &'static str;

    /// Caller-supplied arguments, already marshalled into Rust types.
    type Args;

    /// Result handed to the caller on success.
    type Value: Send + 'static;

    fn prepare(image: &Image, args: Self::Args) -> Result<Self, OperationError>;

    fn process(&mut self) -> Result<(), OperationError>;

    /// Only called after a successful `process`.
    fn value(&mut self) -> Self::Value;

    fn cleanup(&mut self) {}
}
