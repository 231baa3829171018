//! The caller-facing boundary: selection plus export, wired together.
//!
//! A [`Session`] owns the [`SelectionManager`] and the shared collaborators.
//! It feeds acquired images into the selection, opens an
//! [`ExportController`] for the chosen image, and appends successful exports
//! back to the selection so the resized copy sits next to its source.

use crate::acquire::{AcquireError, Acquired, AcquisitionSource};
use crate::config::AppConfig;
use crate::export::{ExportController, ExportOutcome, ExportSettings};
use crate::imaging::{ImageResizer, RustBackend};
use crate::selection::{ImageAsset, SelectionError, SelectionManager, SelectionState};
use crate::store::{ExportStore, FsStore};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No image chosen")]
    NothingChosen,
    #[error(transparent)]
    Acquire(#[from] AcquireError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

pub struct Session<R, S> {
    selection: SelectionManager,
    resizer: Arc<R>,
    store: Arc<S>,
    settings: ExportSettings,
}

impl Session<RustBackend, FsStore> {
    /// Filesystem-backed session configured from `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(RustBackend::new(&config.resize.work_dir)),
            Arc::new(FsStore::new(config.export.collision)),
            ExportSettings::from_config(config),
        )
    }
}

impl<R, S> Session<R, S>
where
    R: ImageResizer + 'static,
    S: ExportStore + 'static,
{
    pub fn new(resizer: Arc<R>, store: Arc<S>, settings: ExportSettings) -> Self {
        Self {
            selection: SelectionManager::new(),
            resizer,
            store,
            settings,
        }
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    /// Ask `source` for an image and append it. `None` if the user cancelled.
    pub fn acquire(
        &mut self,
        source: &impl AcquisitionSource,
    ) -> Result<Option<&ImageAsset>, SessionError> {
        let acquired = source.acquire()?;
        Ok(self.accept(acquired))
    }

    /// Append an acquired image; cancellation leaves the selection untouched.
    pub fn accept(&mut self, acquired: Acquired) -> Option<&ImageAsset> {
        match acquired {
            Acquired::Asset(asset) => self.selection.append(asset).images.last(),
            Acquired::Cancelled => None,
        }
    }

    pub fn toggle_choice(&mut self, index: usize) -> Result<&SelectionState, SessionError> {
        Ok(self.selection.toggle_choice(index)?)
    }

    /// A fresh controller for the chosen image, starting in `Idle`.
    pub fn open_chosen(&self) -> Result<ExportController<R, S>, SessionError> {
        let asset = self
            .selection
            .current()
            .cloned()
            .ok_or(SessionError::NothingChosen)?;
        Ok(ExportController::new(
            asset,
            Arc::clone(&self.resizer),
            Arc::clone(&self.store),
            self.settings.clone(),
        ))
    }

    /// Append a successful export's file to the selection.
    pub fn record_outcome(&mut self, outcome: &ExportOutcome) -> Option<&ImageAsset> {
        let stored = outcome.stored_ref()?;
        let Some(source_ref) = stored.to_str() else {
            log::warn!("Not listing {}: path is not valid UTF-8", stored.display());
            return None;
        };
        let asset = ImageAsset::new(source_ref);
        self.selection.append(asset).images.last()
    }
}
