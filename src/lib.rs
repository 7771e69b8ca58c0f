// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Multi-touch gesture interpretation for 3D block-building views.
//!
//! Tactus turns raw touch contacts into two streams of meaning: camera
//! control (one-finger orbit with momentum, two-finger pinch-zoom and pan)
//! and world editing (tap to place or remove a block, long-press for
//! quick-delete). It owns no camera, world or event loop; hosts plug those
//! in through small traits.
//!
//! # Key entry points
//!
//! - [`camera::CameraGestureEngine`] - touch to rotate / zoom / pan commands
//! - [`edit::BlockEditGestureController`] - taps and long presses to world
//!   edits
//! - [`options::GestureOptions`] - every threshold and sensitivity, with
//!   TOML presets
//! - [`schedule::FrameScheduler`] - frame and timer queue for hosts that own
//!   a render loop
//!
//! # Architecture
//!
//! Data flows one way. Touch events feed a [`input::ContactTracker`]; the
//! [`gesture::GestureClassifier`] labels the live contacts and the camera
//! engine issues commands to a [`camera::CameraSink`], with
//! [`camera::MomentumIntegrator`] coasting the rotation after release.
//! Independently, the [`gesture::TapLongPressRecognizer`] resolves
//! single-contact taps and long presses for the edit controller. Deferred
//! work (momentum frames, long-press deadlines, marker expiry) goes through
//! the [`schedule::Scheduler`] trait with tokens that go stale on cancel.

pub mod camera;
pub mod edit;
pub mod error;
pub mod events;
pub mod gesture;
pub mod input;
pub mod options;
pub mod schedule;
