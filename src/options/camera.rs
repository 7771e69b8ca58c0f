use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use web_time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera Gestures", inline)]
#[serde(default)]
/// Multipliers and thresholds for camera-driving touch gestures.
pub struct CameraOptions {
    /// Rotation sensitivity multiplier (one-finger drag).
    #[schemars(title = "Rotate Speed", range(min = 0.1, max = 4.0), extend("step" = 0.05))]
    pub rotation_sensitivity: f32,
    /// Zoom sensitivity multiplier (two-finger pinch).
    #[schemars(title = "Zoom Speed", range(min = 0.1, max = 4.0), extend("step" = 0.05))]
    pub zoom_sensitivity: f32,
    /// Pan sensitivity multiplier (two-finger drag).
    #[schemars(title = "Pan Speed", range(min = 0.1, max = 4.0), extend("step" = 0.05))]
    pub pan_sensitivity: f32,
    /// Per-sample change in finger distance above which two-finger motion
    /// is a pinch rather than a pan.
    #[schemars(skip)]
    pub pinch_threshold: f32,
    /// Converts a change in finger distance (pixels) into zoom units.
    #[schemars(skip)]
    pub zoom_scale: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            rotation_sensitivity: 1.0,
            zoom_sensitivity: 1.0,
            pan_sensitivity: 1.0,
            pinch_threshold: 5.0,
            zoom_scale: 0.01,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Momentum", inline)]
#[serde(default)]
/// Post-release rotation momentum.
pub struct MomentumOptions {
    /// Keep rotating after a one-finger drag is released.
    #[schemars(title = "Momentum")]
    pub enabled: bool,
    /// Velocity multiplier applied once per frame (must be below 1).
    #[schemars(title = "Friction", range(min = 0.5, max = 0.99), extend("step" = 0.01))]
    pub friction: f32,
    /// Session ends once both velocity axes fall below this.
    #[schemars(skip)]
    pub min_velocity: f32,
    /// Samples further apart than this (ms) resync velocity to zero.
    #[schemars(skip)]
    pub max_sample_gap_ms: u64,
}

impl Default for MomentumOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            friction: 0.92,
            min_velocity: 0.1,
            max_sample_gap_ms: 100,
        }
    }
}

impl MomentumOptions {
    /// Largest gap between velocity samples that still counts as motion.
    #[must_use]
    pub fn max_sample_gap(&self) -> Duration {
        Duration::from_millis(self.max_sample_gap_ms)
    }
}
