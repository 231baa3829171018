//! Application configuration.
//!
//! Loaded from `config.toml` in the config directory (`--config-dir`, default
//! the current directory). Stock defaults are serialized to a TOML table, the
//! user file is deep-merged on top, and the result is deserialized and
//! validated. A missing file means "all defaults".
//!
//! ## Configuration Options
//!
//! ```toml
//! [export]
//! directory = "exports"          # Where exported images are written
//! file_name = "resizedImage.jpg" # Fixed output name
//! collision = "overwrite"        # overwrite | unique
//!
//! [resize]
//! format = "jpeg"                # jpeg | png
//! quality = 100                  # 0-100, JPEG only
//! work_dir = ".resize-export-temp"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::OutputFormat;
use crate::store::CollisionPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Where and how exported images are stored.
    pub export: ExportConfig,
    /// Encoding of the resized image.
    pub resize: ResizeConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resize.quality > 100 {
            return Err(ConfigError::Validation(
                "resize.quality must be 0-100".into(),
            ));
        }
        let name = self.export.file_name.trim();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "export.file_name must not be empty".into(),
            ));
        }
        if Path::new(name).file_name().map(|n| n.len()) != Some(name.len()) {
            return Err(ConfigError::Validation(format!(
                "export.file_name must be a bare file name, got '{name}'"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub directory: PathBuf,
    pub file_name: String,
    pub collision: CollisionPolicy,
}

impl ExportConfig {
    pub fn destination(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("exports"),
            file_name: "resizedImage.jpg".to_string(),
            collision: CollisionPolicy::Overwrite,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub format: OutputFormat,
    pub quality: u32,
    /// Directory for intermediate resized files.
    pub work_dir: PathBuf,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: 100,
            work_dir: PathBuf::from(".resize-export-temp"),
        }
    }
}

// =============================================================================
// Loading and merging
// =============================================================================

/// The stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read `config.toml` from `dir` as a raw TOML value, `None` if absent.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto `base`, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load and validate the config found in `dir`.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let config = resolve_config(stock_defaults_value(), load_raw_config(dir)?)?;
    log::debug!("Loaded config from {}: {config:?}", dir.display());
    Ok(config)
}

/// A fully commented `config.toml` with every key at its default.
///
/// Printed by the `gen-config` command.
pub fn stock_config_toml() -> &'static str {
    r##"# resize-export configuration
# All settings are optional; values shown are the defaults.
# Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Export destination
# ---------------------------------------------------------------------------
[export]
# Directory exported images are written to (created if missing).
directory = "exports"

# Output file name. Every export uses this name.
file_name = "resizedImage.jpg"

# What to do when the file already exists:
#   "overwrite" - replace it
#   "unique"    - write resizedImage-1.jpg, resizedImage-2.jpg, ...
collision = "overwrite"

# ---------------------------------------------------------------------------
# Resize output
# ---------------------------------------------------------------------------
[resize]
# Encoded format: "jpeg" or "png".
format = "jpeg"

# JPEG quality (0 = worst, 100 = best). Ignored for PNG.
quality = 100

# Scratch directory for resized files before they are exported.
work_dir = ".resize-export-temp"
"##
}
