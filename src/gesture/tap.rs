//! Single-contact tap / long-press state machine.
//!
//! ```text
//! Started ──release (fast, still)──▶ Tap
//!    │ ────hold reaches duration───▶ LongPress
//!    └──moved too far / 2nd finger─▶ Cancelled
//! ```
//!
//! Only a contact that touches down while nothing else is down becomes a
//! candidate. A second simultaneous contact suppresses the candidate for the
//! rest of its life; those belong to camera multi-touch gestures. Moving
//! past either the tap or the long-press slop rules out both outcomes.

use glam::Vec2;
use web_time::Instant;

use crate::input::{ContactId, ContactTracker, TouchEvent, TouchPhase};
use crate::options::{LongPressOptions, TapOptions};
use crate::schedule::{ScheduleToken, Scheduler, TokenSource};

/// How a tap candidate resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapOutcome {
    /// Short, still press-and-release.
    Tap {
        /// Release position.
        position: Vec2,
    },
    /// Press held still for the long-press duration.
    LongPress {
        /// Contact position when the hold completed.
        position: Vec2,
    },
    /// The candidate can no longer become a tap or a long press.
    Cancelled,
}

#[derive(Debug, Clone)]
struct TapCandidate {
    id: ContactId,
    origin: Vec2,
    position: Vec2,
    started_at: Instant,
    /// An outcome (long press or cancel) was already reported.
    resolved: bool,
    timer: Option<ScheduleToken>,
}

/// Recognises taps and long presses on one contact stream.
#[derive(Debug)]
pub struct TapLongPressRecognizer {
    tracker: ContactTracker,
    candidate: Option<TapCandidate>,
    tap: TapOptions,
    long_press: LongPressOptions,
    tokens: TokenSource,
}

impl TapLongPressRecognizer {
    /// Recognizer with the given thresholds.
    #[must_use]
    pub fn new(tap: TapOptions, long_press: LongPressOptions) -> Self {
        Self {
            tracker: ContactTracker::new(),
            candidate: None,
            tap,
            long_press,
            tokens: TokenSource::default(),
        }
    }

    /// Tap thresholds.
    #[must_use]
    pub fn tap_options(&self) -> &TapOptions {
        &self.tap
    }

    /// Long-press thresholds.
    #[must_use]
    pub fn long_press_options(&self) -> &LongPressOptions {
        &self.long_press
    }

    /// Replace the tap thresholds. Applies to the current candidate too.
    pub fn set_tap_options(&mut self, tap: TapOptions) {
        self.tap = tap;
    }

    /// Replace the long-press thresholds. Takes effect from the next
    /// contact; an armed timer keeps its deadline.
    pub fn set_long_press_options(&mut self, long_press: LongPressOptions) {
        self.long_press = long_press;
    }

    /// Number of contacts currently down.
    #[must_use]
    pub fn contact_count(&self) -> usize {
        self.tracker.len()
    }

    /// Whether a contact is currently being watched for a tap/long press.
    #[must_use]
    pub fn has_candidate(&self) -> bool {
        self.candidate.as_ref().is_some_and(|c| !c.resolved)
    }

    /// Feed one touch event. Returns the outcome it produced, if any.
    pub fn handle_event(
        &mut self,
        event: &TouchEvent,
        scheduler: &mut dyn Scheduler,
    ) -> Option<TapOutcome> {
        match event.phase {
            TouchPhase::Start => self.on_start(event, scheduler),
            TouchPhase::Move => {
                let _ = self.tracker.ingest_move(&event.points, event.at);
                self.check_movement(scheduler)
            }
            TouchPhase::End => self.on_release(event, scheduler, false),
            TouchPhase::Cancel => self.on_release(event, scheduler, true),
        }
    }

    /// Handle a fired timer. Tokens this recognizer does not hold are
    /// ignored.
    pub fn on_timer(
        &mut self,
        token: ScheduleToken,
        now: Instant,
    ) -> Option<TapOutcome> {
        let candidate = self.candidate.as_mut()?;
        if candidate.timer != Some(token) {
            return None;
        }
        candidate.timer = None;
        if candidate.resolved {
            return None;
        }
        candidate.resolved = true;
        log::debug!(
            "contact {} long press after {:?}",
            candidate.id,
            now.saturating_duration_since(candidate.started_at)
        );
        Some(TapOutcome::LongPress {
            position: candidate.position,
        })
    }

    /// Drop all contacts and the candidate, cancelling its timer.
    pub fn reset(&mut self, scheduler: &mut dyn Scheduler) {
        let _ = self.drop_candidate(scheduler);
        self.tracker.clear();
    }

    fn on_start(
        &mut self,
        event: &TouchEvent,
        scheduler: &mut dyn Scheduler,
    ) -> Option<TapOutcome> {
        self.tracker.ingest_start(&event.points, event.at);

        // A restarted candidate contact is a new press.
        let restarted = self
            .candidate
            .as_ref()
            .is_some_and(|c| event.ids().any(|id| id == c.id));
        if restarted {
            let _ = self.drop_candidate(scheduler);
        }

        if let Some(candidate) = self.candidate.as_mut() {
            if self.tracker.len() > 1 && !candidate.resolved {
                log::debug!(
                    "contact {} suppressed by multi-touch",
                    candidate.id
                );
                candidate.resolved = true;
                if let Some(token) = candidate.timer.take() {
                    scheduler.cancel_timer(token);
                }
                return Some(TapOutcome::Cancelled);
            }
            return None;
        }

        let contact = self.tracker.single()?;
        let token = self.tokens.mint();
        scheduler
            .set_timer(token, contact.started_at + self.long_press.duration());
        self.candidate = Some(TapCandidate {
            id: contact.id,
            origin: contact.origin,
            position: contact.position,
            started_at: contact.started_at,
            resolved: false,
            timer: Some(token),
        });
        None
    }

    /// Re-check the candidate's displacement after a sample.
    fn check_movement(
        &mut self,
        scheduler: &mut dyn Scheduler,
    ) -> Option<TapOutcome> {
        let candidate = self.candidate.as_mut()?;
        let contact = self.tracker.get(candidate.id)?;
        candidate.position = contact.position;
        if candidate.resolved {
            return None;
        }

        let moved = contact.displacement();
        if moved <= self.tap.max_movement
            && moved <= self.long_press.max_movement
        {
            return None;
        }
        log::debug!("contact {} moved {moved:.1}px, cancelled", candidate.id);
        candidate.resolved = true;
        if let Some(token) = candidate.timer.take() {
            scheduler.cancel_timer(token);
        }
        Some(TapOutcome::Cancelled)
    }

    fn on_release(
        &mut self,
        event: &TouchEvent,
        scheduler: &mut dyn Scheduler,
        cancelled: bool,
    ) -> Option<TapOutcome> {
        // Lift positions count as a final sample.
        let _ = self.tracker.ingest_move(&event.points, event.at);
        let movement = self.check_movement(scheduler);
        let _ = self.tracker.ingest_end(event.ids());

        let releases_candidate = self
            .candidate
            .as_ref()
            .is_some_and(|c| self.tracker.get(c.id).is_none());
        if !releases_candidate {
            return movement;
        }
        let candidate = self.drop_candidate(scheduler)?;
        if movement.is_some() || candidate.resolved {
            return movement;
        }
        if cancelled {
            return Some(TapOutcome::Cancelled);
        }

        let held = event.at.saturating_duration_since(candidate.started_at);
        let still = candidate.position.distance(candidate.origin)
            < self.tap.max_movement;
        if still && held < self.tap.max_duration() {
            log::debug!("contact {} tap after {held:?}", candidate.id);
            Some(TapOutcome::Tap {
                position: candidate.position,
            })
        } else {
            None
        }
    }

    fn drop_candidate(
        &mut self,
        scheduler: &mut dyn Scheduler,
    ) -> Option<TapCandidate> {
        let mut candidate = self.candidate.take()?;
        if let Some(token) = candidate.timer.take() {
            scheduler.cancel_timer(token);
        }
        Some(candidate)
    }
}

impl Default for TapLongPressRecognizer {
    fn default() -> Self {
        Self::new(TapOptions::default(), LongPressOptions::default())
    }
}
