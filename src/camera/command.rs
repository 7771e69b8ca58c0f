//! The camera vocabulary the gesture engine speaks.
//!
//! The engine holds no camera state. It issues these commands to whatever
//! camera the host owns; how a rotate or zoom maps onto that camera's axes
//! is the host's business.

use glam::Vec2;
use serde::Serialize;

/// Receiver of camera commands. Called synchronously, once per sample.
pub trait CameraSink {
    /// Orbit the camera by a scaled drag delta.
    fn rotate(&mut self, delta: Vec2);
    /// Zoom; positive when the fingers pinch together.
    fn zoom(&mut self, delta: f32);
    /// Translate the camera by a scaled midpoint delta.
    fn pan(&mut self, delta: Vec2);
}

/// One issued camera command, for recording and replay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CameraCommand {
    /// See [`CameraSink::rotate`].
    Rotate {
        /// Scaled drag delta.
        delta: Vec2,
    },
    /// See [`CameraSink::zoom`].
    Zoom {
        /// Scaled zoom amount.
        delta: f32,
    },
    /// See [`CameraSink::pan`].
    Pan {
        /// Scaled midpoint delta.
        delta: Vec2,
    },
}

/// A `Vec` records every command in issue order.
impl CameraSink for Vec<CameraCommand> {
    fn rotate(&mut self, delta: Vec2) {
        self.push(CameraCommand::Rotate { delta });
    }

    fn zoom(&mut self, delta: f32) {
        self.push(CameraCommand::Zoom { delta });
    }

    fn pan(&mut self, delta: Vec2) {
        self.push(CameraCommand::Pan { delta });
    }
}
