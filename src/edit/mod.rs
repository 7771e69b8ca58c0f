//! Block editing by touch: tap to place or remove, long-press for
//! quick-delete, and touch markers for visual feedback.

/// The tap / long-press driven edit controller.
pub mod controller;
/// Ephemeral touch markers.
pub mod feedback;
/// World and haptics traits the host implements.
pub mod world;

pub use controller::BlockEditGestureController;
pub use feedback::FeedbackToken;
pub use world::{BlockWorld, GridWorld, HapticSink, WorldEdit};
