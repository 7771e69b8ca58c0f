//! Centralized gesture options with TOML preset support.
//!
//! All tunable thresholds (sensitivities, momentum, tap and long-press
//! windows, feedback) are consolidated here. Options serialize to/from TOML
//! so hosts can ship per-device presets.

mod camera;
mod feedback;
mod tap;

use std::path::Path;

pub use camera::{CameraOptions, MomentumOptions};
pub use feedback::FeedbackOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use tap::{LongPressOptions, TapOptions};

use crate::error::TactusError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[tap]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct GestureOptions {
    /// Camera gesture multipliers and pinch threshold.
    pub camera: CameraOptions,
    /// Post-release rotation momentum.
    pub momentum: MomentumOptions,
    /// Tap thresholds.
    pub tap: TapOptions,
    /// Long-press thresholds.
    pub long_press: LongPressOptions,
    /// Touch markers and haptics.
    pub feedback: FeedbackOptions,
}

impl GestureOptions {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(GestureOptions)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, TactusError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, TactusError> {
        toml::from_str(content)
            .map_err(|e| TactusError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), TactusError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TactusError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(TactusError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}
