use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Tap recognition thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Tap", inline)]
#[serde(default)]
pub struct TapOptions {
    /// Maximum displacement from the touch origin, in pixels.
    #[schemars(title = "Tap Slop", range(min = 2.0, max = 40.0), extend("step" = 1.0))]
    pub max_movement: f32,
    /// A release later than this (ms) is not a tap.
    #[schemars(title = "Tap Duration", range(min = 100, max = 1000))]
    pub max_duration_ms: u64,
}

impl Default for TapOptions {
    fn default() -> Self {
        Self {
            max_movement: 10.0,
            max_duration_ms: 300,
        }
    }
}

impl TapOptions {
    /// Tap window as a [`Duration`].
    #[must_use]
    pub fn max_duration(&self) -> Duration {
        Duration::from_millis(self.max_duration_ms)
    }
}

/// Long-press recognition thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Long Press", inline)]
#[serde(default)]
pub struct LongPressOptions {
    /// Maximum displacement from the touch origin, in pixels.
    #[schemars(title = "Hold Slop", range(min = 2.0, max = 40.0), extend("step" = 1.0))]
    pub max_movement: f32,
    /// Hold time (ms) after which a long press fires.
    #[schemars(title = "Hold Duration", range(min = 200, max = 2000))]
    pub duration_ms: u64,
}

impl Default for LongPressOptions {
    fn default() -> Self {
        Self {
            max_movement: 10.0,
            duration_ms: 500,
        }
    }
}

impl LongPressOptions {
    /// Hold time as a [`Duration`].
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}
