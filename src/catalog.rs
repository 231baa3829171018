//! The fixed set of target resolutions offered for export.
//!
//! Resolutions are identified by their canonical `WIDTHxHEIGHT` label. Choosing
//! one is a lookup into [`CATALOG`]; width and height are handed to the resize
//! backend unchanged. There is no aspect-ratio correction here: the backend
//! fills the full target box.
//!
//! | Label | Width | Height | Typical use |
//! |---|---|---|---|
//! | `1080x1920` | 1080 | 1920 | 9:16 story, Full HD |
//! | `2160x3840` | 2160 | 3840 | 9:16 story, 4K |
//! | `1080x1350` | 1080 | 1350 | 4:5 portrait post |
//! | `2160x2700` | 2160 | 2700 | 4:5 portrait post, 2x |

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unknown resolution '{0}' (run `resize-export resolutions` for the list)")]
    UnknownResolution(String),
}

/// One supported export target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolutionOption {
    label: &'static str,
    pub width: u32,
    pub height: u32,
}

impl ResolutionOption {
    const fn new(label: &'static str, width: u32, height: u32) -> Self {
        Self {
            label,
            width,
            height,
        }
    }

    /// Canonical label, e.g. `"1080x1920"`.
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Every resolution the export screen offers, in display order.
pub const CATALOG: [ResolutionOption; 4] = [
    ResolutionOption::new("1080x1920", 1080, 1920),
    ResolutionOption::new("2160x3840", 2160, 3840),
    ResolutionOption::new("1080x1350", 1080, 1350),
    ResolutionOption::new("2160x2700", 2160, 2700),
];

pub fn all() -> &'static [ResolutionOption] {
    &CATALOG
}

/// Find a catalog entry by its exact label.
pub fn lookup(label: &str) -> Option<ResolutionOption> {
    CATALOG.iter().copied().find(|r| r.label == label)
}

impl FromStr for ResolutionOption {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(s.trim()).ok_or_else(|| CatalogError::UnknownResolution(s.to_string()))
    }
}

impl fmt::Display for ResolutionOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

impl Serialize for ResolutionOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label)
    }
}

impl<'de> Deserialize<'de> for ResolutionOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}
