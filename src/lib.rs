//! # resize-export
//!
//! Pick images, choose one, choose a target resolution, and save a resized
//! copy.
//!
//! # Pipeline
//!
//! ```text
//! acquire ──▶ SelectionManager ──▶ chosen image ──▶ ExportController
//!  (picker)    (append, toggle)                        │
//!                                                      ├─ 1. ImageResizer::resize
//!                                                      └─ 2. ExportStore::write
//!                                                             │
//!                                               ExportOutcome ◀┘
//! ```
//!
//! The resize and the store write run one after the other: the store copies
//! the file the resize produced. A controller runs at most one export at a
//! time and reports every collaborator failure as an [`export::ExportOutcome`]
//! tagged with the failing stage.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | The fixed list of target resolutions |
//! | [`selection`] | Acquired images and the single chosen one |
//! | [`acquire`] | Image sources (file picker), cancellation as a value |
//! | [`imaging`] | [`imaging::ImageResizer`] trait and the pure-Rust backend |
//! | [`store`] | [`store::ExportStore`] trait and the filesystem store |
//! | [`export`] | The resize-export state machine |
//! | [`session`] | Wires selection, collaborators and controllers together |
//! | [`config`] | `config.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## No Aspect-Ratio Handling
//!
//! A resolution is passed to the backend as-is. [`imaging::RustBackend`]
//! uses `resize_exact`, so the output always has exactly the chosen
//! dimensions and a source with a different aspect ratio is stretched.
//!
//! ## Blocking Collaborators, Async Controller
//!
//! Resizing and copying are plain blocking calls behind `Send + Sync` traits,
//! which keeps backends and test mocks simple. The controller moves them onto
//! tokio's blocking pool so callers never block while an export runs.

pub mod acquire;
pub mod catalog;
pub mod config;
pub mod export;
pub mod imaging;
pub mod output;
pub mod selection;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
