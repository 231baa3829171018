//! Acquired images and the single "chosen" one.
//!
//! The [`SelectionManager`] keeps images in insertion order (no dedup) and an
//! optional index into that list. At most one image is chosen at a time:
//! choosing another image replaces the choice, choosing the same one again
//! clears it.
//!
//! ```text
//! images:  [ a.jpg, b.jpg, c.jpg ]
//!                     ^
//! chosen_index: Some(1)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Index {index} is out of range ({len} images)")]
    IndexOutOfRange { index: usize, len: usize },
}

static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique image identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(u64);

impl AssetId {
    fn next() -> Self {
        Self(NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An acquired image. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    id: AssetId,
    source_ref: String,
}

impl ImageAsset {
    pub fn new(source_ref: impl Into<String>) -> Self {
        Self {
            id: AssetId::next(),
            source_ref: source_ref.into(),
        }
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    /// URI or filesystem path of the image.
    pub fn source_ref(&self) -> &str {
        &self.source_ref
    }
}

/// Snapshot of the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub images: Vec<ImageAsset>,
    pub chosen_index: Option<usize>,
}

impl SelectionState {
    pub fn is_chosen(&self, index: usize) -> bool {
        self.chosen_index == Some(index)
    }
}

/// Owns the [`SelectionState`]. Mutated only through [`append`](Self::append)
/// and [`toggle_choice`](Self::toggle_choice); each call either applies fully
/// or not at all.
#[derive(Debug, Default)]
pub struct SelectionManager {
    state: SelectionState,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an image to the end of the list. The current choice is untouched.
    pub fn append(&mut self, asset: ImageAsset) -> &SelectionState {
        log::debug!("Selection: appended {} {}", asset.id, asset.source_ref);
        self.state.images.push(asset);
        &self.state
    }

    /// Choose the image at `index`, or clear the choice if it is already chosen.
    pub fn toggle_choice(&mut self, index: usize) -> Result<&SelectionState, SelectionError> {
        let len = self.state.images.len();
        if index >= len {
            return Err(SelectionError::IndexOutOfRange { index, len });
        }
        self.state.chosen_index = if self.state.chosen_index == Some(index) {
            None
        } else {
            Some(index)
        };
        Ok(&self.state)
    }

    /// The chosen image, if any.
    pub fn current(&self) -> Option<&ImageAsset> {
        self.state
            .chosen_index
            .and_then(|index| self.state.images.get(index))
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.state.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn manager_with(refs: &[&str]) -> SelectionManager {
        let mut manager = SelectionManager::new();
        for r in refs {
            manager.append(ImageAsset::new(*r));
        }
        manager
    }

    #[test]
    fn new_manager_is_empty() {
        let manager = SelectionManager::new();
        assert!(manager.is_empty());
        assert_eq!(manager.current(), None);
        assert_eq!(manager.state().chosen_index, None);
    }

    #[test]
    fn asset_ids_are_unique() {
        let a = ImageAsset::new("same.jpg");
        let b = ImageAsset::new("same.jpg");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.source_ref(), b.source_ref());
    }

    #[test]
    fn append_keeps_duplicates() {
        let manager = manager_with(&["a.jpg", "a.jpg"]);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn append_does_not_change_choice() {
        let mut manager = manager_with(&["a.jpg", "b.jpg"]);
        manager.toggle_choice(0).unwrap();
        let state = manager.append(ImageAsset::new("c.jpg"));
        assert_eq!(state.chosen_index, Some(0));
        assert_eq!(manager.current().unwrap().source_ref(), "a.jpg");
    }

    #[test]
    fn toggle_selects_then_clears() {
        let mut manager = manager_with(&["a.jpg"]);
        assert_eq!(manager.toggle_choice(0).unwrap().chosen_index, Some(0));
        assert_eq!(manager.toggle_choice(0).unwrap().chosen_index, None);
        assert_eq!(manager.current(), None);
    }

    #[test]
    fn toggle_other_index_replaces_choice() {
        let mut manager = manager_with(&["a.jpg", "b.jpg", "c.jpg"]);
        manager.toggle_choice(0).unwrap();
        let state = manager.toggle_choice(2).unwrap();
        assert_eq!(state.chosen_index, Some(2));
        assert!(!state.is_chosen(0));
        assert_eq!(manager.current().unwrap().source_ref(), "c.jpg");
    }

    #[test]
    fn toggle_out_of_range_is_rejected() {
        let mut manager = manager_with(&["a.jpg", "b.jpg"]);
        manager.toggle_choice(1).unwrap();
        let before = manager.state().clone();

        let err = manager.toggle_choice(2).unwrap_err();
        assert_eq!(err, SelectionError::IndexOutOfRange { index: 2, len: 2 });
        assert_eq!(manager.state(), &before);
    }

    #[test]
    fn toggle_on_empty_is_rejected() {
        let mut manager = SelectionManager::new();
        assert!(matches!(
            manager.toggle_choice(0),
            Err(SelectionError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn state_serializes_to_json() {
        let mut manager = manager_with(&["a.jpg"]);
        manager.toggle_choice(0).unwrap();
        let json = serde_json::to_value(manager.state()).unwrap();
        assert_eq!(json["chosen_index"], 0);
        assert_eq!(json["images"][0]["source_ref"], "a.jpg");
    }

    proptest! {
        #[test]
        fn append_preserves_count_and_order(refs in proptest::collection::vec("[a-z]{1,8}\\.jpg", 0..32)) {
            let mut manager = SelectionManager::new();
            for r in &refs {
                manager.append(ImageAsset::new(r.clone()));
            }
            let stored: Vec<&str> = manager.state().images.iter().map(|a| a.source_ref()).collect();
            let expected: Vec<&str> = refs.iter().map(String::as_str).collect();
            prop_assert_eq!(stored, expected);
        }

        #[test]
        fn double_toggle_clears(len in 1usize..16, pick in 0usize..16) {
            let index = pick % len;
            let mut manager = SelectionManager::new();
            for i in 0..len {
                manager.append(ImageAsset::new(format!("{i}.jpg")));
            }
            manager.toggle_choice(index).unwrap();
            prop_assert_eq!(manager.toggle_choice(index).unwrap().chosen_index, None);
        }

        #[test]
        fn second_toggle_replaces_first(len in 2usize..16, i in 0usize..16, j in 0usize..16) {
            let (i, j) = (i % len, j % len);
            prop_assume!(i != j);
            let mut manager = SelectionManager::new();
            for n in 0..len {
                manager.append(ImageAsset::new(format!("{n}.jpg")));
            }
            manager.toggle_choice(i).unwrap();
            prop_assert_eq!(manager.toggle_choice(j).unwrap().chosen_index, Some(j));
        }

        #[test]
        fn out_of_range_leaves_state_unchanged(len in 0usize..8, extra in 0usize..8, chosen in proptest::option::of(0usize..8)) {
            let mut manager = SelectionManager::new();
            for n in 0..len {
                manager.append(ImageAsset::new(format!("{n}.jpg")));
            }
            if let Some(c) = chosen.filter(|c| *c < len) {
                manager.toggle_choice(c).unwrap();
            }
            let before = manager.state().clone();
            let result = manager.toggle_choice(len + extra);
            prop_assert!(result.is_err());
            prop_assert_eq!(manager.state(), &before);
        }
    }
}
