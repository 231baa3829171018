//! Resize backend trait and shared types.
//!
//! The [`ImageResizer`] trait is the seam between the export controller and
//! whatever produces the resized bytes. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend); tests use the recording
//! mock in this module.

use super::params::ResizeParams;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("Failed to encode {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
    #[error("Invalid target dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Produces resized copies of images.
///
/// Calls are blocking; the export controller runs them on tokio's blocking
/// pool, so implementations must be `Send + Sync`.
pub trait ImageResizer: Send + Sync {
    /// Resize to exactly `width`x`height` and return where the result was written.
    fn resize(&self, params: &ResizeParams) -> Result<PathBuf, ResizeError>;

    /// Called once the store is done with a file returned by `resize`.
    fn discard(&self, _output: &Path) {}
}
