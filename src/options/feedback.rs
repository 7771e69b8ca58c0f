use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Visual and haptic feedback for block editing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Feedback", inline)]
#[serde(default)]
pub struct FeedbackOptions {
    /// Lifetime (ms) of the touch marker spawned on every contact start.
    #[schemars(skip)]
    pub marker_ttl_ms: u64,
    /// Vibrate when quick-delete mode is entered.
    #[schemars(title = "Haptics")]
    pub haptics: bool,
    /// Length (ms) of the haptic pulse.
    #[schemars(skip)]
    pub haptic_pulse_ms: u64,
}

impl Default for FeedbackOptions {
    fn default() -> Self {
        Self {
            marker_ttl_ms: 400,
            haptics: true,
            haptic_pulse_ms: 50,
        }
    }
}

impl FeedbackOptions {
    /// Touch marker lifetime.
    #[must_use]
    pub fn marker_ttl(&self) -> Duration {
        Duration::from_millis(self.marker_ttl_ms)
    }

    /// Haptic pulse length.
    #[must_use]
    pub fn haptic_pulse(&self) -> Duration {
        Duration::from_millis(self.haptic_pulse_ms)
    }
}
