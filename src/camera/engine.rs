//! Converts classified touch motion into camera commands.
//!
//! The `CameraGestureEngine` owns all transient camera-gesture state
//! (contacts, the pinch/pan anchor, momentum) and the listener list. It is
//! the only thing that sits between raw touch events and the host camera.

use glam::Vec2;
use web_time::Instant;

use super::command::CameraSink;
use super::momentum::MomentumIntegrator;
use crate::events::{GestureEvent, GestureKind, ListenerHandle, Listeners};
use crate::gesture::{Classified, GestureClassifier, GestureState};
use crate::input::{ContactTracker, TouchEvent, TouchPhase, TouchPoint};
use crate::options::{CameraOptions, GestureOptions, MomentumOptions};
use crate::schedule::{FrameScheduler, ScheduleToken, Scheduler, Wakeup};

/// Turns touch events into rotate / zoom / pan commands.
///
/// # Usage
///
/// ```
/// use tactus::camera::{CameraCommand, CameraGestureEngine};
/// use tactus::input::{TouchEvent, TouchPoint};
/// use tactus::schedule::FrameScheduler;
/// use web_time::{Duration, Instant};
///
/// let mut engine = CameraGestureEngine::new(
///     Vec::<CameraCommand>::new(),
///     FrameScheduler::new(),
/// );
/// let t0 = Instant::now();
/// let down = vec![TouchPoint::new(1, 0.0, 0.0)];
/// engine.handle_event(&TouchEvent::start(down, t0));
/// engine.handle_event(&TouchEvent::moved(
///     vec![TouchPoint::new(1, 4.0, 2.0)],
///     t0 + Duration::from_millis(16),
/// ));
/// assert_eq!(engine.sink().len(), 1);
///
/// // Once per display frame:
/// engine.advance(Instant::now());
/// ```
#[derive(Debug)]
pub struct CameraGestureEngine<C: CameraSink, S: Scheduler> {
    sink: C,
    scheduler: S,
    tracker: ContactTracker,
    classifier: GestureClassifier,
    momentum: MomentumIntegrator,
    options: CameraOptions,
    listeners: Listeners,
    enabled: bool,
    destroyed: bool,
}

impl<C: CameraSink, S: Scheduler> CameraGestureEngine<C, S> {
    /// Engine with default options.
    pub fn new(sink: C, scheduler: S) -> Self {
        Self::with_options(sink, scheduler, &GestureOptions::default())
    }

    /// Engine configured from the camera and momentum sections of
    /// `options`.
    pub fn with_options(
        sink: C,
        scheduler: S,
        options: &GestureOptions,
    ) -> Self {
        Self {
            sink,
            scheduler,
            tracker: ContactTracker::new(),
            classifier: GestureClassifier::new(options.camera.pinch_threshold),
            momentum: MomentumIntegrator::new(options.momentum.clone()),
            options: options.camera.clone(),
            listeners: Listeners::default(),
            enabled: true,
            destroyed: false,
        }
    }

    // ── Collaborators ──────────────────────────────────────────────────

    /// The camera sink.
    #[must_use]
    pub fn sink(&self) -> &C {
        &self.sink
    }

    /// Mutable access to the camera sink.
    pub fn sink_mut(&mut self) -> &mut C {
        &mut self.sink
    }

    /// The scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutable access to the scheduler.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    // ── Introspection ──────────────────────────────────────────────────

    /// Number of contacts currently down.
    #[must_use]
    pub fn contact_count(&self) -> usize {
        self.tracker.len()
    }

    /// Current camera gesture.
    #[must_use]
    pub fn gesture_state(&self) -> GestureState {
        self.classifier.state()
    }

    /// Whether post-release momentum is rotating the camera.
    #[must_use]
    pub fn is_momentum_active(&self) -> bool {
        self.momentum.is_active()
    }

    /// Whether events are being processed.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // ── Configuration ──────────────────────────────────────────────────

    /// Camera gesture options in effect.
    #[must_use]
    pub fn options(&self) -> &CameraOptions {
        &self.options
    }

    /// Momentum options in effect.
    #[must_use]
    pub fn momentum_options(&self) -> &MomentumOptions {
        self.momentum.options()
    }

    /// Replace camera and momentum options.
    pub fn set_options(&mut self, options: &GestureOptions) {
        self.options = options.camera.clone();
        self.classifier
            .set_pinch_threshold(options.camera.pinch_threshold);
        self.momentum.set_options(options.momentum.clone());
        if !options.momentum.enabled {
            self.momentum.cancel(&mut self.scheduler);
        }
    }

    /// Rotation sensitivity multiplier (unclamped).
    pub fn set_rotation_sensitivity(&mut self, sensitivity: f32) {
        self.options.rotation_sensitivity = sensitivity;
    }

    /// Zoom sensitivity multiplier (unclamped).
    pub fn set_zoom_sensitivity(&mut self, sensitivity: f32) {
        self.options.zoom_sensitivity = sensitivity;
    }

    /// Pan sensitivity multiplier (unclamped).
    pub fn set_pan_sensitivity(&mut self, sensitivity: f32) {
        self.options.pan_sensitivity = sensitivity;
    }

    /// Enable or disable post-release momentum. Disabling stops a running
    /// session immediately.
    pub fn set_momentum_enabled(&mut self, enabled: bool) {
        self.momentum.set_enabled(enabled, &mut self.scheduler);
    }

    // ── Listeners ──────────────────────────────────────────────────────

    /// Subscribe to [`GestureKind::Drag`] or [`GestureKind::Pinch`]
    /// events. Other kinds are accepted but never emitted by this engine.
    pub fn subscribe(
        &mut self,
        kind: GestureKind,
        callback: impl FnMut(&GestureEvent) + 'static,
    ) -> ListenerHandle {
        self.listeners.subscribe(kind, callback)
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        self.listeners.unsubscribe(handle)
    }

    // ── Lifecycle ──────────────────────────────────────────────────────

    /// Resume processing. No effect after [`destroy`](Self::destroy).
    pub fn enable(&mut self) {
        if self.destroyed {
            log::warn!("enable() on a destroyed camera gesture engine");
            return;
        }
        self.enabled = true;
    }

    /// Stop processing: cancels momentum and forgets every contact.
    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.momentum.cancel(&mut self.scheduler);
        self.tracker.clear();
        self.classifier.reset();
    }

    /// Disable permanently and release every listener.
    pub fn destroy(&mut self) {
        self.disable();
        self.listeners.clear();
        self.destroyed = true;
    }

    // ── Event handling ─────────────────────────────────────────────────

    /// Process one touch event. Camera commands are issued before this
    /// returns.
    pub fn handle_event(&mut self, event: &TouchEvent) {
        if !self.enabled {
            return;
        }
        match event.phase {
            TouchPhase::Start => self.on_start(event),
            TouchPhase::Move => self.on_move(&event.points, event.at),
            TouchPhase::End | TouchPhase::Cancel => self.on_release(event),
        }
    }

    /// Handle a frame wakeup. Tokens the engine no longer holds are
    /// ignored.
    pub fn on_frame(&mut self, token: ScheduleToken) {
        if !self.enabled {
            return;
        }
        if let Some(step) = self.momentum.on_frame(token, &mut self.scheduler)
        {
            self.sink.rotate(step * self.options.rotation_sensitivity);
        }
    }

    fn on_start(&mut self, event: &TouchEvent) {
        // A new contact always stops momentum.
        self.momentum.cancel(&mut self.scheduler);
        self.tracker.ingest_start(&event.points, event.at);
        if self.classifier.on_contacts_changed(&self.tracker)
            == GestureState::Rotate
        {
            self.momentum.begin_tracking(event.at);
        }
    }

    fn on_move(&mut self, points: &[TouchPoint], at: Instant) {
        if self.tracker.ingest_move(points, at) == 0 {
            return;
        }
        match self.classifier.on_move(&self.tracker) {
            Classified::Idle => {}
            Classified::Rotate { position, delta } => {
                self.momentum.record(delta, at);
                if delta != Vec2::ZERO {
                    self.sink
                        .rotate(delta * self.options.rotation_sensitivity);
                    self.emit(&GestureEvent::Drag { position, delta });
                }
            }
            Classified::Pinch {
                midpoint,
                distance_change,
            } => {
                self.sink.zoom(
                    -distance_change
                        * self.options.zoom_scale
                        * self.options.zoom_sensitivity,
                );
                self.emit(&GestureEvent::Pinch {
                    midpoint,
                    distance_change,
                });
            }
            Classified::Pan { midpoint, delta } => {
                if delta != Vec2::ZERO {
                    self.sink.pan(delta * self.options.pan_sensitivity);
                    self.emit(&GestureEvent::Drag {
                        position: midpoint,
                        delta,
                    });
                }
            }
        }
    }

    fn on_release(&mut self, event: &TouchEvent) {
        // A lift reported somewhere new is a final move sample.
        if event.phase == TouchPhase::End {
            let moved: Vec<TouchPoint> = event
                .points
                .iter()
                .filter(|p| {
                    self.tracker
                        .get(p.id)
                        .is_some_and(|c| c.position != p.position)
                })
                .copied()
                .collect();
            if !moved.is_empty() {
                self.on_move(&moved, event.at);
            }
        }

        let was = self.classifier.state();
        if self.tracker.ingest_end(event.ids()).is_empty() {
            return;
        }
        let now = self.classifier.on_contacts_changed(&self.tracker);

        match now {
            GestureState::Rotate => self.momentum.begin_tracking(event.at),
            GestureState::None
                if was == GestureState::Rotate
                    && self.tracker.is_empty()
                    && event.phase == TouchPhase::End =>
            {
                let _ = self.momentum.release(event.at, &mut self.scheduler);
            }
            _ => {}
        }
    }

    fn emit(&mut self, event: &GestureEvent) {
        let _ = self.listeners.emit(event);
    }
}

impl<C: CameraSink> CameraGestureEngine<C, FrameScheduler> {
    /// Run every frame callback due at `now`. Call once per display frame.
    pub fn advance(&mut self, now: Instant) {
        for wakeup in self.scheduler.take_due(now) {
            match wakeup {
                Wakeup::Frame(token) => self.on_frame(token),
                Wakeup::Timer(token) => {
                    log::trace!("camera engine ignores timer {}", token.raw());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use web_time::Duration;

    use super::*;
    use crate::camera::CameraCommand;

    type Engine = CameraGestureEngine<Vec<CameraCommand>, FrameScheduler>;

    struct Harness {
        engine: Engine,
        t0: Instant,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                engine: Engine::new(Vec::new(), FrameScheduler::new()),
                t0: Instant::now(),
            }
        }

        fn at(&self, ms: u64) -> Instant {
            self.t0 + Duration::from_millis(ms)
        }

        fn send(
            &mut self,
            phase: TouchPhase,
            ms: u64,
            points: &[(u64, f32, f32)],
        ) {
            let event = TouchEvent {
                phase,
                points: points
                    .iter()
                    .map(|&(id, x, y)| TouchPoint::new(id, x, y))
                    .collect(),
                at: self.at(ms),
            };
            self.engine.handle_event(&event);
        }

        fn take_commands(&mut self) -> Vec<CameraCommand> {
            std::mem::take(self.engine.sink_mut())
        }

        /// One-finger flick to the right, released at 40 ms. Returns the
        /// drag commands so later reads see momentum output only.
        fn flick(&mut self) -> Vec<CameraCommand> {
            self.send(TouchPhase::Start, 0, &[(1, 0.0, 0.0)]);
            self.send(TouchPhase::Move, 16, &[(1, 10.0, 0.0)]);
            self.send(TouchPhase::Move, 32, &[(1, 20.0, 0.0)]);
            self.send(TouchPhase::End, 40, &[(1, 20.0, 0.0)]);
            self.take_commands()
        }

        /// Step frames at 60 Hz from `from_ms`, collecting commands.
        fn run_frames(
            &mut self,
            from_ms: u64,
            frames: u32,
        ) -> Vec<CameraCommand> {
            let start = self.at(from_ms);
            for i in 1..=frames {
                self.engine.advance(start + Duration::from_micros(16_667) * i);
            }
            self.take_commands()
        }
    }

    fn rotate_x(commands: &[CameraCommand]) -> Vec<f32> {
        commands
            .iter()
            .map(|c| match c {
                CameraCommand::Rotate { delta } => delta.x,
                other => unreachable!("unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn single_contact_rotates_with_scaled_delta() {
        let mut h = Harness::new();
        h.engine.set_rotation_sensitivity(2.0);
        h.send(TouchPhase::Start, 0, &[(1, 50.0, 50.0)]);
        assert_eq!(h.engine.gesture_state(), GestureState::Rotate);
        h.send(TouchPhase::Move, 16, &[(1, 53.0, 49.0)]);
        h.send(TouchPhase::Move, 32, &[(1, 53.0, 49.0)]);
        h.send(TouchPhase::Move, 48, &[(1, 60.0, 52.0)]);
        assert_eq!(
            h.take_commands(),
            vec![
                CameraCommand::Rotate {
                    delta: Vec2::new(6.0, -2.0)
                },
                CameraCommand::Rotate {
                    delta: Vec2::new(14.0, 6.0)
                },
            ]
        );
        assert_eq!(h.engine.gesture_state(), GestureState::Rotate);
    }

    #[test]
    fn pinching_in_zooms_positive() {
        let mut h = Harness::new();
        h.send(TouchPhase::Start, 0, &[(1, 100.0, 100.0), (2, 200.0, 100.0)]);
        assert_eq!(h.engine.gesture_state(), GestureState::Pinch);
        h.send(TouchPhase::Move, 16, &[(1, 125.0, 100.0), (2, 175.0, 100.0)]);
        assert_eq!(h.engine.gesture_state(), GestureState::Pinch);
        match h.take_commands().as_slice() {
            [CameraCommand::Zoom { delta }] => {
                assert!((delta - 0.5).abs() < 1e-6);
            }
            other => unreachable!("expected one zoom, got {other:?}"),
        }
    }

    #[test]
    fn parallel_drag_pans_by_midpoint_delta() {
        let mut h = Harness::new();
        h.engine.set_pan_sensitivity(0.5);
        h.send(TouchPhase::Start, 0, &[(1, 100.0, 100.0), (2, 200.0, 100.0)]);
        h.send(TouchPhase::Move, 16, &[(1, 120.0, 120.0), (2, 220.0, 120.0)]);
        assert_eq!(h.engine.gesture_state(), GestureState::Pan);
        assert_eq!(
            h.take_commands(),
            vec![CameraCommand::Pan {
                delta: Vec2::new(10.0, 10.0)
            }]
        );
    }

    #[test]
    fn zoom_sensitivity_scales_pinch() {
        let mut h = Harness::new();
        h.engine.set_zoom_sensitivity(3.0);
        h.send(TouchPhase::Start, 0, &[(1, 0.0, 0.0), (2, 100.0, 0.0)]);
        h.send(TouchPhase::Move, 16, &[(2, 120.0, 0.0)]);
        match h.take_commands().as_slice() {
            [CameraCommand::Zoom { delta }] => {
                assert!((delta + 0.6).abs() < 1e-6);
            }
            other => unreachable!("expected one zoom, got {other:?}"),
        }
    }

    #[test]
    fn released_flick_coasts_with_decreasing_steps() {
        let mut h = Harness::new();
        assert_eq!(h.flick().len(), 2);
        assert!(h.engine.is_momentum_active());
        assert_eq!(h.engine.gesture_state(), GestureState::None);

        let steps = rotate_x(&h.run_frames(40, 200));
        assert!(steps.len() > 10, "only {} momentum steps", steps.len());
        assert!(steps.windows(2).all(|w| w[1] < w[0]));
        assert!(steps.iter().all(|&x| x > 0.0));
        assert!(!h.engine.is_momentum_active());

        // Settled for good.
        assert!(h.run_frames(4000, 10).is_empty());
        assert!(h.engine.scheduler().is_idle());
    }

    #[test]
    fn new_contact_stops_momentum_immediately() {
        let mut h = Harness::new();
        let _ = h.flick();
        assert_eq!(h.run_frames(40, 3).len(), 3);

        h.send(TouchPhase::Start, 100, &[(2, 300.0, 300.0)]);
        assert!(!h.engine.is_momentum_active());
        assert!(h.run_frames(100, 30).is_empty());
    }

    #[test]
    fn stale_frame_callback_is_ignored() {
        let mut h = Harness::new();
        let _ = h.flick();
        let now = h.at(56);
        let due = h.engine.scheduler_mut().take_due(now);
        let [Wakeup::Frame(token)] = due.as_slice() else {
            unreachable!("expected one frame, got {due:?}");
        };
        h.send(TouchPhase::Start, 57, &[(2, 0.0, 0.0)]);
        h.engine.on_frame(*token);
        assert!(h.take_commands().is_empty());
    }

    #[test]
    fn paused_release_has_no_momentum() {
        let mut h = Harness::new();
        h.send(TouchPhase::Start, 0, &[(1, 0.0, 0.0)]);
        h.send(TouchPhase::Move, 16, &[(1, 30.0, 0.0)]);
        h.send(TouchPhase::End, 400, &[(1, 30.0, 0.0)]);
        assert!(!h.engine.is_momentum_active());
        assert!(h.engine.scheduler().is_idle());
    }

    #[test]
    fn momentum_can_be_switched_off() {
        let mut h = Harness::new();
        h.engine.set_momentum_enabled(false);
        assert_eq!(h.flick().len(), 2);
        assert!(!h.engine.is_momentum_active());
        assert!(h.run_frames(40, 10).is_empty());
    }

    #[test]
    fn cancel_never_flings() {
        let mut h = Harness::new();
        h.send(TouchPhase::Start, 0, &[(1, 0.0, 0.0)]);
        h.send(TouchPhase::Move, 16, &[(1, 30.0, 0.0)]);
        h.send(TouchPhase::Cancel, 20, &[(1, 30.0, 0.0)]);
        assert!(!h.engine.is_momentum_active());
        assert_eq!(h.engine.contact_count(), 0);
    }

    #[test]
    fn pinch_then_lifting_both_does_not_fling() {
        let mut h = Harness::new();
        h.send(TouchPhase::Start, 0, &[(1, 0.0, 0.0), (2, 100.0, 0.0)]);
        h.send(TouchPhase::Move, 16, &[(1, 30.0, 0.0), (2, 70.0, 0.0)]);
        h.send(TouchPhase::End, 24, &[(2, 70.0, 0.0)]);
        assert_eq!(h.engine.gesture_state(), GestureState::Rotate);
        h.send(TouchPhase::End, 30, &[(1, 30.0, 0.0)]);
        assert!(!h.engine.is_momentum_active());
    }

    #[test]
    fn lift_at_new_position_is_a_final_rotate() {
        let mut h = Harness::new();
        h.engine.set_momentum_enabled(false);
        h.send(TouchPhase::Start, 0, &[(1, 0.0, 0.0)]);
        h.send(TouchPhase::End, 16, &[(1, 4.0, 0.0)]);
        assert_eq!(
            h.take_commands(),
            vec![CameraCommand::Rotate {
                delta: Vec2::new(4.0, 0.0)
            }]
        );
    }

    #[test]
    fn unknown_ids_are_absorbed() {
        let mut h = Harness::new();
        h.send(TouchPhase::End, 0, &[(9, 0.0, 0.0)]);
        h.send(TouchPhase::Cancel, 0, &[(9, 0.0, 0.0)]);
        h.send(TouchPhase::Move, 0, &[(9, 5.0, 5.0)]);
        assert!(h.take_commands().is_empty());
        assert_eq!(h.engine.gesture_state(), GestureState::None);
    }

    #[test]
    fn disabled_engine_accepts_input_silently() {
        let mut h = Harness::new();
        let _ = h.flick();
        h.engine.disable();
        h.engine.disable();
        assert!(!h.engine.is_momentum_active());

        h.send(TouchPhase::Start, 100, &[(1, 0.0, 0.0)]);
        h.send(TouchPhase::Move, 116, &[(1, 9.0, 0.0)]);
        assert!(h.take_commands().is_empty());
        assert_eq!(h.engine.contact_count(), 0);

        h.engine.enable();
        h.send(TouchPhase::Start, 200, &[(1, 0.0, 0.0)]);
        h.send(TouchPhase::Move, 216, &[(1, 9.0, 0.0)]);
        assert_eq!(h.take_commands().len(), 1);
    }

    #[test]
    fn listeners_hear_drag_and_pinch() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut h = Harness::new();
        let drags = Rc::clone(&events);
        let _drag = h.engine.subscribe(GestureKind::Drag, move |e| {
            drags.borrow_mut().push(*e);
        });
        let pinches = Rc::clone(&events);
        let pinch = h.engine.subscribe(GestureKind::Pinch, move |e| {
            pinches.borrow_mut().push(*e);
        });

        h.send(TouchPhase::Start, 0, &[(1, 0.0, 0.0)]);
        h.send(TouchPhase::Move, 16, &[(1, 2.0, 0.0)]);
        h.send(TouchPhase::Start, 20, &[(2, 100.0, 0.0)]);
        h.send(TouchPhase::Move, 36, &[(2, 150.0, 0.0)]);
        assert_eq!(
            *events.borrow(),
            vec![
                GestureEvent::Drag {
                    position: Vec2::new(2.0, 0.0),
                    delta: Vec2::new(2.0, 0.0),
                },
                GestureEvent::Pinch {
                    midpoint: Vec2::new(76.0, 0.0),
                    distance_change: 50.0,
                },
            ]
        );

        assert!(h.engine.unsubscribe(pinch));
        h.send(TouchPhase::Move, 52, &[(2, 200.0, 0.0)]);
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn destroy_is_final_and_idempotent() {
        let count = Rc::new(RefCell::new(0));
        let mut h = Harness::new();
        let seen = Rc::clone(&count);
        let handle = h
            .engine
            .subscribe(GestureKind::Drag, move |_| *seen.borrow_mut() += 1);
        let _ = h.flick();
        h.engine.destroy();
        h.engine.destroy();
        h.engine.enable();
        assert!(!h.engine.is_enabled());
        assert!(!h.engine.unsubscribe(handle));
        assert_eq!(h.engine.listener_count(), 0);
        assert!(h.run_frames(40, 10).is_empty());
        assert_eq!(*count.borrow(), 2);
    }
}
