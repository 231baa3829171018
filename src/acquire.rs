//! Image acquisition.
//!
//! A source yields at most one image per call. The user backing out of a
//! picker is [`Acquired::Cancelled`], an ordinary value rather than an error.

use crate::imaging::supported_input_extensions;
use crate::selection::ImageAsset;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    #[error("Image not found: {0}")]
    NotFound(PathBuf),
    #[error("Unsupported image type: {0} (supported: {1})")]
    Unsupported(PathBuf, String),
    #[error("Image path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquired {
    Asset(ImageAsset),
    Cancelled,
}

/// Anything that can hand over an image: a library picker, a camera.
pub trait AcquisitionSource {
    fn acquire(&self) -> Result<Acquired, AcquireError>;
}

/// Library picker over the local filesystem.
///
/// `None` stands for the user closing the picker without choosing.
#[derive(Debug, Clone)]
pub struct FilePicker {
    path: Option<PathBuf>,
}

impl FilePicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn cancelled() -> Self {
        Self { path: None }
    }
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

impl AcquisitionSource for FilePicker {
    fn acquire(&self) -> Result<Acquired, AcquireError> {
        let Some(path) = &self.path else {
            log::debug!("Picker cancelled");
            return Ok(Acquired::Cancelled);
        };
        let Some(source_ref) = path.to_str() else {
            return Err(AcquireError::NonUtf8Path(path.clone()));
        };
        if !path.is_file() {
            return Err(AcquireError::NotFound(path.clone()));
        }
        if !has_supported_extension(path) {
            return Err(AcquireError::Unsupported(
                path.clone(),
                supported_input_extensions().join(", "),
            ));
        }
        Ok(Acquired::Asset(ImageAsset::new(source_ref)))
    }
}
