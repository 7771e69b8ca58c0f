//! Input handling: platform-agnostic touch events and the contact tracker
//! every recognizer builds on.

/// Live contact bookkeeping.
pub mod contact;
/// Platform-agnostic touch events.
pub mod event;

pub use contact::{Contact, ContactTracker};
pub use event::{ContactId, TouchEvent, TouchPhase, TouchPoint};
