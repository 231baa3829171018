//! Resize-export controller.
//!
//! One controller is opened per chosen image. It tracks the chosen resolution
//! and runs at most one export at a time:
//!
//! ```text
//!            choose_resolution            export()
//!   Idle ──────────────────────▶ ResolutionChosen ──────────▶ Exporting
//!                                  ▲      │ choose_resolution     │
//!                                  │      └───────────┘           │ resize → store
//!                                  │                              ▼
//!                                  └──────────────────── Completed(outcome)
//! ```
//!
//! An export resizes first and only writes to the store once the resize has
//! produced a file. The attempt runs on its own tokio task with both calls on
//! the blocking pool, so once started it runs to completion even if the caller
//! stops waiting. Every failure of either collaborator becomes an
//! [`ExportOutcome::Failure`] tagged with the stage that failed; only
//! precondition violations are returned as [`ExportError`]. After an attempt
//! the resolution is kept, so exporting again needs no new choice.

use crate::catalog::ResolutionOption;
use crate::config::AppConfig;
use crate::imaging::{ImageResizer, OutputFormat, Quality, ResizeParams};
use crate::selection::ImageAsset;
use crate::store::ExportStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("Select a resolution before exporting")]
    NoResolutionSelected,
    #[error("An export is already in progress")]
    OperationInProgress,
    #[error("The export was interrupted before it finished")]
    Interrupted,
}

/// Which collaborator failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Resize,
    Store,
}

/// Result of one export attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExportOutcome {
    Success { stored_ref: PathBuf },
    Failure { stage: FailureStage, cause: String },
}

impl ExportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExportOutcome::Success { .. })
    }

    pub fn stored_ref(&self) -> Option<&Path> {
        match self {
            ExportOutcome::Success { stored_ref } => Some(stored_ref),
            ExportOutcome::Failure { .. } => None,
        }
    }
}

/// The image and resolution of one export attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeRequest {
    pub source: ImageAsset,
    pub target: ResolutionOption,
}

impl ResizeRequest {
    fn to_params(&self, settings: &ExportSettings) -> ResizeParams {
        ResizeParams {
            source: PathBuf::from(self.source.source_ref()),
            width: self.target.width,
            height: self.target.height,
            format: settings.format,
            quality: settings.quality,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    ResolutionChosen(ResolutionOption),
    Exporting(ResolutionOption),
    Completed {
        resolution: ResolutionOption,
        outcome: ExportOutcome,
    },
}

/// Progress notifications, sent when a channel is attached with
/// [`ExportController::with_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEvent {
    Started {
        source: String,
        resolution: ResolutionOption,
    },
    Resized {
        output: PathBuf,
    },
    Completed(ExportOutcome),
}

/// Encoding and destination used for every export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub format: OutputFormat,
    pub quality: Quality,
    pub destination: PathBuf,
}

impl ExportSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            format: config.resize.format,
            quality: Quality::new(config.resize.quality),
            destination: config.export.destination(),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

pub struct ExportController<R, S> {
    asset: ImageAsset,
    resizer: Arc<R>,
    store: Arc<S>,
    settings: ExportSettings,
    phase: Arc<Mutex<ExportPhase>>,
    events: Option<Sender<ExportEvent>>,
}

fn lock(phase: &Mutex<ExportPhase>) -> MutexGuard<'_, ExportPhase> {
    phase.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns the controller to `ResolutionChosen` when an attempt ends.
struct AttemptGuard {
    phase: Arc<Mutex<ExportPhase>>,
    resolution: ResolutionOption,
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        *lock(&self.phase) = ExportPhase::ResolutionChosen(self.resolution);
    }
}

impl<R, S> ExportController<R, S>
where
    R: ImageResizer + 'static,
    S: ExportStore + 'static,
{
    pub fn new(
        asset: ImageAsset,
        resizer: Arc<R>,
        store: Arc<S>,
        settings: ExportSettings,
    ) -> Self {
        Self {
            asset,
            resizer,
            store,
            settings,
            phase: Arc::new(Mutex::new(ExportPhase::Idle)),
            events: None,
        }
    }

    pub fn with_events(mut self, events: Sender<ExportEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn asset(&self) -> &ImageAsset {
        &self.asset
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn phase(&self) -> ExportPhase {
        lock(&self.phase).clone()
    }

    /// The resolution currently chosen, if any.
    pub fn resolution(&self) -> Option<ResolutionOption> {
        match *lock(&self.phase) {
            ExportPhase::Idle => None,
            ExportPhase::ResolutionChosen(r)
            | ExportPhase::Exporting(r)
            | ExportPhase::Completed { resolution: r, .. } => Some(r),
        }
    }

    /// Pick the target resolution. The last choice wins.
    ///
    /// Rejected while an export is running.
    pub fn choose_resolution(&self, option: ResolutionOption) -> Result<(), ExportError> {
        let mut phase = lock(&self.phase);
        if matches!(
            *phase,
            ExportPhase::Exporting(_) | ExportPhase::Completed { .. }
        ) {
            return Err(ExportError::OperationInProgress);
        }
        log::debug!("Resolution chosen: {option}");
        *phase = ExportPhase::ResolutionChosen(option);
        Ok(())
    }

    /// Resize the image to the chosen resolution and write it to the store.
    ///
    /// The attempt runs on its own task. Dropping the returned future stops
    /// waiting for it but not the attempt itself, and the controller stays in
    /// `Exporting` until the attempt finishes.
    pub async fn export(&self) -> Result<ExportOutcome, ExportError> {
        let resolution = self.begin()?;
        let attempt = Attempt {
            request: ResizeRequest {
                source: self.asset.clone(),
                target: resolution,
            },
            resizer: Arc::clone(&self.resizer),
            store: Arc::clone(&self.store),
            settings: self.settings.clone(),
            events: self.events.clone(),
            guard: AttemptGuard {
                phase: Arc::clone(&self.phase),
                resolution,
            },
        };

        match tokio::spawn(attempt.run()).await {
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(ExportError::Interrupted),
        }
    }

    /// Check preconditions and enter `Exporting`.
    fn begin(&self) -> Result<ResolutionOption, ExportError> {
        let mut phase = lock(&self.phase);
        let resolution = match *phase {
            ExportPhase::Idle => return Err(ExportError::NoResolutionSelected),
            ExportPhase::Exporting(_) | ExportPhase::Completed { .. } => {
                return Err(ExportError::OperationInProgress);
            }
            ExportPhase::ResolutionChosen(resolution) => resolution,
        };
        *phase = ExportPhase::Exporting(resolution);
        Ok(resolution)
    }
}

/// One export attempt. Owns everything it touches so it can outlive the
/// caller's future; dropping it releases `Exporting`.
struct Attempt<R, S> {
    request: ResizeRequest,
    resizer: Arc<R>,
    store: Arc<S>,
    settings: ExportSettings,
    events: Option<Sender<ExportEvent>>,
    guard: AttemptGuard,
}

impl<R, S> Attempt<R, S>
where
    R: ImageResizer + 'static,
    S: ExportStore + 'static,
{
    async fn run(self) -> ExportOutcome {
        let resolution = self.request.target;
        self.emit(ExportEvent::Started {
            source: self.request.source.source_ref().to_string(),
            resolution,
        });

        let outcome = self.resize_then_store().await;

        *lock(&self.guard.phase) = ExportPhase::Completed {
            resolution,
            outcome: outcome.clone(),
        };
        self.emit(ExportEvent::Completed(outcome.clone()));
        outcome
    }

    async fn resize_then_store(&self) -> ExportOutcome {
        let params = self.request.to_params(&self.settings);
        log::info!(
            "Exporting {} at {} ({:?}, quality {})",
            self.request.source.source_ref(),
            self.request.target,
            params.format,
            params.quality.value()
        );

        let resizer = Arc::clone(&self.resizer);
        let resized = match tokio::task::spawn_blocking(move || resizer.resize(&params)).await {
            Ok(Ok(path)) => path,
            Ok(Err(e)) => return failure(FailureStage::Resize, e.to_string()),
            Err(e) => return failure(FailureStage::Resize, format!("resize task failed: {e}")),
        };
        self.emit(ExportEvent::Resized {
            output: resized.clone(),
        });

        let resizer = Arc::clone(&self.resizer);
        let store = Arc::clone(&self.store);
        let destination = self.settings.destination.clone();
        let written = tokio::task::spawn_blocking(move || {
            let written = store.write(&resized, &destination);
            resizer.discard(&resized);
            written
        })
        .await;
        match written {
            Ok(Ok(stored_ref)) => {
                log::info!("Export saved to {}", stored_ref.display());
                ExportOutcome::Success { stored_ref }
            }
            Ok(Err(e)) => failure(FailureStage::Store, e.to_string()),
            Err(e) => failure(FailureStage::Store, format!("store task failed: {e}")),
        }
    }

    fn emit(&self, event: ExportEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

fn failure(stage: FailureStage, cause: String) -> ExportOutcome {
    log::warn!("Export failed during {stage:?}: {cause}");
    ExportOutcome::Failure { stage, cause }
}
