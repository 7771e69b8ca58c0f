//! Ephemeral touch markers.

use glam::Vec2;
use serde::Serialize;
use web_time::{Duration, Instant};

/// A marker shown where a contact touched down. It expires after its TTL
/// whatever the gesture turns into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeedbackToken {
    /// Per-controller marker id.
    pub id: u64,
    /// Raw screen position of the touch.
    pub position: Vec2,
    /// When the contact started.
    #[serde(skip)]
    pub created_at: Instant,
    /// Marker lifetime.
    pub ttl: Duration,
}

impl FeedbackToken {
    /// When the marker disappears.
    #[must_use]
    pub fn expires_at(&self) -> Instant {
        self.created_at + self.ttl
    }

    /// Fraction of the lifetime left at `now`, from 1.0 down to 0.0. Hosts
    /// use it to fade the marker.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> f32 {
        if self.ttl.is_zero() {
            return 0.0;
        }
        let age = now.saturating_duration_since(self.created_at);
        (1.0 - age.as_secs_f32() / self.ttl.as_secs_f32()).clamp(0.0, 1.0)
    }
}
