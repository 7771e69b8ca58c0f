//! Gesture recognizers: camera gesture classification and the tap /
//! long-press state machine.

/// Rotate / pinch / pan classification from live contacts.
pub mod classifier;
/// Single-contact tap and long-press recognition.
pub mod tap;

pub use classifier::{Classified, GestureClassifier, GestureState};
pub use tap::{TapLongPressRecognizer, TapOutcome};
