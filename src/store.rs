//! Export store: where resized images end up.
//!
//! The store copies a finished file to its destination. With
//! [`CollisionPolicy::Overwrite`] every export to the same file name replaces
//! the previous one; [`CollisionPolicy::Unique`] claims the first free
//! `name-N.ext` instead.
//!
//! ```text
//! exports/resizedImage.jpg      ← Overwrite (always this path)
//! exports/resizedImage-1.jpg    ← Unique, when resizedImage.jpg exists
//! exports/resizedImage-2.jpg
//! ```

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Permission denied writing {path}")]
    PermissionDenied { path: PathBuf },
    #[error("Path unavailable: {path} ({source})")]
    PathUnavailable { path: PathBuf, source: io::Error },
    #[error("IO error writing {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

impl StoreError {
    /// Classify an IO failure that happened while writing `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                StoreError::PermissionDenied { path }
            }
            io::ErrorKind::NotFound
            | io::ErrorKind::NotADirectory
            | io::ErrorKind::IsADirectory => StoreError::PathUnavailable { path, source: err },
            _ => StoreError::Io { path, source: err },
        }
    }
}

/// What to do when the destination file already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    #[default]
    Overwrite,
    Unique,
}

/// Write target for exported images.
pub trait ExportStore: Send + Sync {
    /// Copy `source` to `destination` and return the path actually written.
    fn write(&self, source: &Path, destination: &Path) -> Result<PathBuf, StoreError>;
}

/// Local filesystem store.
#[derive(Debug, Clone, Default)]
pub struct FsStore {
    collision: CollisionPolicy,
}

impl FsStore {
    pub fn new(collision: CollisionPolicy) -> Self {
        Self { collision }
    }

    fn resolve_destination(&self, destination: &Path) -> io::Result<PathBuf> {
        match self.collision {
            CollisionPolicy::Overwrite => Ok(destination.to_path_buf()),
            CollisionPolicy::Unique => claim_unique_destination(destination),
        }
    }
}

/// Create the first of `name.ext`, `name-1.ext`, `name-2.ext`, ... that does
/// not exist yet and return it. Creating the file claims the name, so two
/// writers never pick the same one.
pub fn claim_unique_destination(destination: &Path) -> io::Result<PathBuf> {
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = destination
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = destination.parent().unwrap_or_else(|| Path::new(""));

    let mut candidate = destination.to_path_buf();
    for n in 1u32.. {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                candidate = parent.join(format!("{stem}-{n}{ext}"));
            }
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "no free export file name",
    ))
}

impl ExportStore for FsStore {
    fn write(&self, source: &Path, destination: &Path) -> Result<PathBuf, StoreError> {
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::from_io(parent, e))?;
        }
        let target = self
            .resolve_destination(destination)
            .map_err(|e| StoreError::from_io(destination, e))?;
        if self.collision == CollisionPolicy::Overwrite && target.exists() {
            log::info!("Overwriting existing export {}", target.display());
        }
        if let Err(e) = std::fs::copy(source, &target) {
            if self.collision == CollisionPolicy::Unique {
                let _ = std::fs::remove_file(&target);
            }
            return Err(StoreError::from_io(&target, e));
        }
        Ok(target)
    }
}
