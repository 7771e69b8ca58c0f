//! Camera gestures.
//!
//! Classifies live contacts into rotate, pinch and pan, issues scaled
//! commands to a host camera, and coasts the rotation with momentum after a
//! one-finger flick.

/// Camera commands and the sink trait hosts implement.
pub mod command;
/// The touch-to-camera engine.
pub mod engine;
/// Post-release rotation momentum.
pub mod momentum;

pub use command::{CameraCommand, CameraSink};
pub use engine::CameraGestureEngine;
pub use momentum::{MomentumIntegrator, VelocitySample};
