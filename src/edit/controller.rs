//! Tap-to-edit on top of the tap / long-press recognizer.
//!
//! A tap on a block removes it, a tap on empty space places the current
//! selection, and a long press enters quick-delete mode until the finger
//! lifts. Every touch-down also leaves a short-lived marker for the host to
//! draw.

use std::fmt;

use web_time::Instant;

use super::feedback::FeedbackToken;
use super::world::{BlockWorld, HapticSink};
use crate::events::{GestureEvent, GestureKind, ListenerHandle, Listeners};
use crate::gesture::{TapLongPressRecognizer, TapOutcome};
use crate::input::{TouchEvent, TouchPhase};
use crate::options::{
    FeedbackOptions, GestureOptions, LongPressOptions, TapOptions,
};
use crate::schedule::{
    FrameScheduler, ScheduleToken, Scheduler, TokenSource, Wakeup,
};

/// Lane for marker timers; the recognizer mints from lane 0.
const FEEDBACK_LANE: u8 = 1;

/// Drives world edits from taps and long presses on one contact stream.
pub struct BlockEditGestureController<W: BlockWorld, S: Scheduler> {
    world: W,
    scheduler: S,
    recognizer: TapLongPressRecognizer,
    selection: W::Block,
    quick_delete: bool,
    feedback: Vec<(ScheduleToken, FeedbackToken)>,
    feedback_options: FeedbackOptions,
    next_marker: u64,
    marker_timers: TokenSource,
    haptics: Option<Box<dyn HapticSink>>,
    listeners: Listeners,
    enabled: bool,
    destroyed: bool,
}

impl<W: BlockWorld, S: Scheduler> BlockEditGestureController<W, S> {
    /// Controller with default thresholds placing `selection` on taps.
    pub fn new(world: W, scheduler: S, selection: W::Block) -> Self {
        Self::with_options(
            world,
            scheduler,
            selection,
            &GestureOptions::default(),
        )
    }

    /// Controller configured from the tap, long-press and feedback sections
    /// of `options`.
    pub fn with_options(
        world: W,
        scheduler: S,
        selection: W::Block,
        options: &GestureOptions,
    ) -> Self {
        Self {
            world,
            scheduler,
            recognizer: TapLongPressRecognizer::new(
                options.tap.clone(),
                options.long_press.clone(),
            ),
            selection,
            quick_delete: false,
            feedback: Vec::new(),
            feedback_options: options.feedback.clone(),
            next_marker: 0,
            marker_timers: TokenSource::lane(FEEDBACK_LANE),
            haptics: None,
            listeners: Listeners::default(),
            enabled: true,
            destroyed: false,
        }
    }

    // ── Collaborators ──────────────────────────────────────────────────

    /// The world being edited.
    #[must_use]
    pub fn world(&self) -> &W {
        &self.world
    }

    /// Mutable access to the world.
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
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

    /// Vibrate through `sink` when quick-delete mode is entered.
    pub fn set_haptic_sink(&mut self, sink: impl HapticSink + 'static) {
        self.haptics = Some(Box::new(sink));
    }

    /// Detach the haptic sink.
    pub fn clear_haptic_sink(&mut self) {
        self.haptics = None;
    }

    // ── Introspection ──────────────────────────────────────────────────

    /// Number of contacts currently down.
    #[must_use]
    pub fn contact_count(&self) -> usize {
        self.recognizer.contact_count()
    }

    /// Whether a long press put the editor into quick-delete mode.
    #[must_use]
    pub fn is_quick_delete_mode(&self) -> bool {
        self.quick_delete
    }

    /// Live touch markers, oldest first.
    #[must_use]
    pub fn feedback_tokens(&self) -> impl Iterator<Item = &FeedbackToken> {
        self.feedback.iter().map(|(_, marker)| marker)
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

    /// Block placed by taps on empty space.
    #[must_use]
    pub fn selection(&self) -> &W::Block {
        &self.selection
    }

    /// Change the block placed by taps.
    pub fn set_selection(&mut self, selection: W::Block) {
        self.selection = selection;
    }

    /// Tap thresholds in effect.
    #[must_use]
    pub fn tap_options(&self) -> &TapOptions {
        self.recognizer.tap_options()
    }

    /// Long-press thresholds in effect.
    #[must_use]
    pub fn long_press_options(&self) -> &LongPressOptions {
        self.recognizer.long_press_options()
    }

    /// Replace the tap thresholds.
    pub fn set_tap_options(&mut self, tap: TapOptions) {
        self.recognizer.set_tap_options(tap);
    }

    /// Replace the long-press thresholds.
    pub fn set_long_press_options(&mut self, long_press: LongPressOptions) {
        self.recognizer.set_long_press_options(long_press);
    }

    /// Replace marker and haptic settings. Live markers keep their TTL.
    pub fn set_feedback_options(&mut self, feedback: FeedbackOptions) {
        self.feedback_options = feedback;
    }

    /// Replace tap, long-press and feedback options.
    pub fn set_options(&mut self, options: &GestureOptions) {
        self.set_tap_options(options.tap.clone());
        self.set_long_press_options(options.long_press.clone());
        self.set_feedback_options(options.feedback.clone());
    }

    // ── Listeners ──────────────────────────────────────────────────────

    /// Subscribe to [`GestureKind::Tap`] or [`GestureKind::LongPress`]
    /// events. Other kinds are accepted but never emitted here.
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
            log::warn!("enable() on a destroyed block edit controller");
            return;
        }
        self.enabled = true;
    }

    /// Stop processing and drop the candidate, its timer, every marker and
    /// quick-delete mode.
    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.recognizer.reset(&mut self.scheduler);
        for (token, _) in self.feedback.drain(..) {
            self.scheduler.cancel_timer(token);
        }
        self.quick_delete = false;
    }

    /// Disable permanently and release listeners and the haptic sink.
    pub fn destroy(&mut self) {
        self.disable();
        self.listeners.clear();
        self.haptics = None;
        self.destroyed = true;
    }

    // ── Event handling ─────────────────────────────────────────────────

    /// Process one touch event.
    pub fn handle_event(&mut self, event: &TouchEvent) {
        if !self.enabled {
            return;
        }
        if event.phase == TouchPhase::Start {
            self.spawn_markers(event);
        }
        if let Some(outcome) =
            self.recognizer.handle_event(event, &mut self.scheduler)
        {
            self.resolve(outcome);
        }
        if event.is_release() && self.quick_delete {
            log::debug!("quick-delete mode off");
            self.quick_delete = false;
        }
    }

    /// Handle a fired timer: a marker expiring or a long-press deadline.
    /// Tokens the controller no longer holds are ignored.
    pub fn on_timer(&mut self, token: ScheduleToken, now: Instant) {
        if !self.enabled {
            return;
        }
        if let Some(index) = self.feedback.iter().position(|(t, _)| *t == token)
        {
            let (_, marker) = self.feedback.remove(index);
            log::trace!("marker {} expired", marker.id);
            return;
        }
        if let Some(outcome) = self.recognizer.on_timer(token, now) {
            self.resolve(outcome);
        }
    }

    fn spawn_markers(&mut self, event: &TouchEvent) {
        let ttl = self.feedback_options.marker_ttl();
        for point in &event.points {
            self.next_marker += 1;
            let token = self.marker_timers.mint();
            self.scheduler.set_timer(token, event.at + ttl);
            self.feedback.push((
                token,
                FeedbackToken {
                    id: self.next_marker,
                    position: point.position,
                    created_at: event.at,
                    ttl,
                },
            ));
        }
    }

    fn resolve(&mut self, outcome: TapOutcome) {
        match outcome {
            TapOutcome::Tap { position } => {
                if self.world.block_at(position).is_some() {
                    log::debug!("tap at {position} removes block");
                    self.world.remove_block(position);
                } else {
                    log::debug!("tap at {position} places block");
                    self.world.place_block(position, self.selection.clone());
                }
                self.emit(&GestureEvent::Tap { position });
            }
            TapOutcome::LongPress { position } => {
                log::debug!("quick-delete mode on at {position}");
                self.quick_delete = true;
                self.emit(&GestureEvent::LongPress { position });
                if self.feedback_options.haptics {
                    if let Some(haptics) = self.haptics.as_mut() {
                        haptics.vibrate(self.feedback_options.haptic_pulse());
                    }
                }
            }
            TapOutcome::Cancelled => {}
        }
    }

    fn emit(&mut self, event: &GestureEvent) {
        let _ = self.listeners.emit(event);
    }
}

impl<W: BlockWorld> BlockEditGestureController<W, FrameScheduler> {
    /// Run every timer due at `now`. Call once per display frame.
    pub fn advance(&mut self, now: Instant) {
        for wakeup in self.scheduler.take_due(now) {
            match wakeup {
                Wakeup::Timer(token) => self.on_timer(token, now),
                Wakeup::Frame(token) => {
                    log::trace!("block editor ignores frame {}", token.raw());
                }
            }
        }
    }
}

impl<W: BlockWorld, S: Scheduler> fmt::Debug
    for BlockEditGestureController<W, S>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockEditGestureController")
            .field("recognizer", &self.recognizer)
            .field("quick_delete", &self.quick_delete)
            .field("feedback", &self.feedback.len())
            .field("haptics", &self.haptics.is_some())
            .field("listeners", &self.listeners)
            .field("enabled", &self.enabled)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::{IVec2, Vec2};
    use web_time::Duration;

    use super::*;
    use crate::edit::world::{GridWorld, WorldEdit};
    use crate::input::TouchPoint;

    type Controller =
        BlockEditGestureController<GridWorld<&'static str>, FrameScheduler>;

    struct Harness {
        controller: Controller,
        events: Rc<RefCell<Vec<GestureEvent>>>,
        t0: Instant,
    }

    impl Harness {
        fn new() -> Self {
            let mut controller = Controller::new(
                GridWorld::new(32.0),
                FrameScheduler::new(),
                "stone",
            );
            let events = Rc::new(RefCell::new(Vec::new()));
            for kind in [GestureKind::Tap, GestureKind::LongPress] {
                let sink = Rc::clone(&events);
                let _ = controller
                    .subscribe(kind, move |e| sink.borrow_mut().push(*e));
            }
            Self {
                controller,
                events,
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
            self.controller.handle_event(&event);
        }

        fn advance(&mut self, ms: u64) {
            let now = self.at(ms);
            self.controller.advance(now);
        }

        fn tap(&mut self, ms: u64, x: f32, y: f32) {
            self.send(TouchPhase::Start, ms, &[(1, x, y)]);
            self.send(TouchPhase::End, ms + 40, &[(1, x, y)]);
        }
    }

    #[test]
    fn tap_places_then_removes() {
        let mut h = Harness::new();
        h.tap(0, 100.0, 100.0);
        let spot = Vec2::new(100.0, 100.0);
        assert_eq!(h.controller.world().block_at(spot), Some("stone"));

        h.controller.set_selection("glass");
        h.tap(200, 100.0, 100.0);
        assert!(h.controller.world().is_empty());
        assert_eq!(
            h.controller.world().edits(),
            [
                WorldEdit::Place {
                    cell: IVec2::new(3, 3),
                    block: "stone"
                },
                WorldEdit::Remove {
                    cell: IVec2::new(3, 3)
                },
            ]
        );
        let tap = GestureEvent::Tap {
            position: Vec2::new(100.0, 100.0),
        };
        assert_eq!(*h.events.borrow(), vec![tap, tap]);
    }

    #[test]
    fn slow_or_moving_presses_edit_nothing() {
        let mut h = Harness::new();
        h.send(TouchPhase::Start, 0, &[(1, 100.0, 100.0)]);
        h.send(TouchPhase::End, 350, &[(1, 100.0, 100.0)]);

        h.send(TouchPhase::Start, 1000, &[(1, 100.0, 100.0)]);
        h.send(TouchPhase::Move, 1016, &[(1, 115.0, 100.0)]);
        h.send(TouchPhase::End, 1030, &[(1, 115.0, 100.0)]);

        assert!(h.controller.world().edits().is_empty());
        assert!(h.events.borrow().is_empty());
    }

    #[test]
    fn long_press_enters_quick_delete_until_release() {
        let pulses = Rc::new(RefCell::new(Vec::new()));
        let mut h = Harness::new();
        let seen = Rc::clone(&pulses);
        h.controller.set_haptic_sink(move |pulse: Duration| {
            seen.borrow_mut().push(pulse);
        });

        h.send(TouchPhase::Start, 0, &[(1, 50.0, 50.0)]);
        h.advance(499);
        assert!(!h.controller.is_quick_delete_mode());
        h.advance(500);
        assert!(h.controller.is_quick_delete_mode());
        assert_eq!(
            *h.events.borrow(),
            vec![GestureEvent::LongPress {
                position: Vec2::new(50.0, 50.0)
            }]
        );
        assert_eq!(*pulses.borrow(), vec![Duration::from_millis(50)]);

        h.send(TouchPhase::End, 800, &[(1, 50.0, 50.0)]);
        assert!(!h.controller.is_quick_delete_mode());
        assert!(h.controller.world().edits().is_empty());
        assert_eq!(h.events.borrow().len(), 1);
    }

    #[test]
    fn cancel_also_leaves_quick_delete() {
        let mut h = Harness::new();
        h.send(TouchPhase::Start, 0, &[(1, 50.0, 50.0)]);
        h.advance(600);
        assert!(h.controller.is_quick_delete_mode());
        h.send(TouchPhase::Cancel, 700, &[(1, 50.0, 50.0)]);
        assert!(!h.controller.is_quick_delete_mode());
    }

    #[test]
    fn haptics_can_be_turned_off() {
        let pulses = Rc::new(RefCell::new(0));
        let mut h = Harness::new();
        let seen = Rc::clone(&pulses);
        h.controller
            .set_haptic_sink(move |_: Duration| *seen.borrow_mut() += 1);
        h.controller.set_feedback_options(FeedbackOptions {
            haptics: false,
            ..FeedbackOptions::default()
        });
        h.send(TouchPhase::Start, 0, &[(1, 50.0, 50.0)]);
        h.advance(600);
        assert!(h.controller.is_quick_delete_mode());
        assert_eq!(*pulses.borrow(), 0);
    }

    #[test]
    fn every_start_leaves_a_marker_that_expires() {
        let mut h = Harness::new();
        h.send(TouchPhase::Start, 0, &[(1, 10.0, 10.0), (2, 90.0, 10.0)]);
        h.send(TouchPhase::End, 100, &[(1, 10.0, 10.0), (2, 90.0, 10.0)]);
        h.send(TouchPhase::Start, 200, &[(3, 40.0, 40.0)]);

        let positions: Vec<Vec2> =
            h.controller.feedback_tokens().map(|m| m.position).collect();
        assert_eq!(
            positions,
            vec![
                Vec2::new(10.0, 10.0),
                Vec2::new(90.0, 10.0),
                Vec2::new(40.0, 40.0)
            ]
        );

        h.advance(400);
        let left: Vec<u64> =
            h.controller.feedback_tokens().map(|m| m.id).collect();
        assert_eq!(left, vec![3]);
        h.advance(600);
        assert_eq!(h.controller.feedback_tokens().count(), 0);
    }

    #[test]
    fn second_finger_suppresses_tap() {
        let mut h = Harness::new();
        h.send(TouchPhase::Start, 0, &[(1, 100.0, 100.0)]);
        h.send(TouchPhase::Start, 10, &[(2, 200.0, 100.0)]);
        h.send(TouchPhase::End, 30, &[(2, 200.0, 100.0)]);
        h.send(TouchPhase::End, 40, &[(1, 100.0, 100.0)]);
        assert!(h.controller.world().edits().is_empty());
        assert!(h.events.borrow().is_empty());
    }

    #[test]
    fn disable_drops_all_in_flight_state() {
        let mut h = Harness::new();
        h.send(TouchPhase::Start, 0, &[(1, 50.0, 50.0)]);
        h.advance(500);
        assert!(h.controller.is_quick_delete_mode());

        h.controller.disable();
        h.controller.disable();
        assert!(!h.controller.is_quick_delete_mode());
        assert_eq!(h.controller.feedback_tokens().count(), 0);
        assert_eq!(h.controller.contact_count(), 0);
        assert!(h.controller.scheduler().is_idle());

        h.tap(1000, 100.0, 100.0);
        assert!(h.controller.world().is_empty());

        h.controller.enable();
        h.tap(2000, 100.0, 100.0);
        assert_eq!(h.controller.world().len(), 1);
    }

    #[test]
    fn long_press_timer_from_before_disable_is_ignored() {
        let mut h = Harness::new();
        h.send(TouchPhase::Start, 0, &[(1, 50.0, 50.0)]);
        let due = {
            let now = h.at(500);
            h.controller.scheduler_mut().take_due(now)
        };
        h.controller.disable();
        h.controller.enable();
        for wakeup in due {
            if let Wakeup::Timer(token) = wakeup {
                let now = h.at(500);
                h.controller.on_timer(token, now);
            }
        }
        assert!(!h.controller.is_quick_delete_mode());
        assert!(h.events.borrow().is_empty());
    }

    #[test]
    fn destroy_releases_listeners_for_good() {
        let mut h = Harness::new();
        assert_eq!(h.controller.listener_count(), 2);
        h.controller.destroy();
        h.controller.destroy();
        assert_eq!(h.controller.listener_count(), 0);
        h.controller.enable();
        assert!(!h.controller.is_enabled());
        h.tap(0, 100.0, 100.0);
        assert!(h.controller.world().is_empty());
    }
}
