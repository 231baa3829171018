//! Image resizing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Resize → JPEG/PNG** | `resize_exact` (Lanczos3) + `image` encoders |
//! | **Scratch files** | `tempfile::Builder` in the work directory |
//!
//! The module is split into:
//! - **Parameters**: what a resize should produce ([`ResizeParams`], [`Quality`], [`OutputFormat`])
//! - **Backend**: [`ImageResizer`] trait + [`RustBackend`]

pub mod backend;
mod params;
pub mod rust_backend;

pub use backend::{ImageResizer, ResizeError};
pub use params::{OutputFormat, Quality, ResizeParams};
pub use rust_backend::{RustBackend, supported_input_extensions};
