//! Contact-count driven gesture classification.
//!
//! One contact rotates. Two contacts pinch or pan, decided afresh on every
//! move sample by how much the finger distance changed since the previous
//! sample. The decision is deliberately not sticky, so a gesture that is
//! half pinch and half pan can alternate between the two from one frame to
//! the next.

use glam::Vec2;

use crate::input::{Contact, ContactTracker};

/// The camera gesture currently in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureState {
    /// No contact, or more contacts than any gesture uses.
    #[default]
    None,
    /// One contact: orbit the camera.
    Rotate,
    /// Two contacts whose distance is changing: zoom.
    Pinch,
    /// Two contacts moving together: pan.
    Pan,
}

/// What a single move sample means for the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classified {
    /// Nothing to do.
    Idle,
    /// One contact moved.
    Rotate {
        /// Contact position after the move.
        position: Vec2,
        /// Raw movement in pixels.
        delta: Vec2,
    },
    /// Two contacts moved apart or together.
    Pinch {
        /// Midpoint between the contacts.
        midpoint: Vec2,
        /// Distance now minus distance at the previous sample.
        distance_change: f32,
    },
    /// Two contacts moved together.
    Pan {
        /// Midpoint between the contacts.
        midpoint: Vec2,
        /// Midpoint movement since the previous sample.
        delta: Vec2,
    },
}

/// Pair geometry remembered from the previous two-contact sample.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PairAnchor {
    distance: f32,
    midpoint: Vec2,
}

impl PairAnchor {
    fn of(a: &Contact, b: &Contact) -> Self {
        Self {
            distance: a.position.distance(b.position),
            midpoint: (a.position + b.position) * 0.5,
        }
    }
}

/// Derives the [`GestureState`] from the live contacts.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    state: GestureState,
    anchor: Option<PairAnchor>,
    pinch_threshold: f32,
}

impl GestureClassifier {
    /// Classifier that calls two-contact motion a pinch once the finger
    /// distance changes by more than `pinch_threshold` in one sample.
    #[must_use]
    pub fn new(pinch_threshold: f32) -> Self {
        Self {
            state: GestureState::None,
            anchor: None,
            pinch_threshold,
        }
    }

    /// Current classification.
    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Change the pinch/pan threshold.
    pub fn set_pinch_threshold(&mut self, threshold: f32) {
        self.pinch_threshold = threshold;
    }

    /// Re-derive the state after contacts started or ended.
    ///
    /// Arriving at two contacts anchors the pair at its current geometry
    /// and reports a pinch until the first move sample says otherwise.
    /// Leaving two contacts discards the anchor.
    pub fn on_contacts_changed(
        &mut self,
        tracker: &ContactTracker,
    ) -> GestureState {
        let previous = self.state;
        match tracker.pair() {
            Some((a, b)) => {
                self.anchor = Some(PairAnchor::of(a, b));
                self.state = GestureState::Pinch;
            }
            None => {
                self.anchor = None;
                self.state = if tracker.len() == 1 {
                    GestureState::Rotate
                } else {
                    GestureState::None
                };
            }
        }
        if previous != self.state {
            log::debug!(
                "gesture {previous:?} -> {:?} ({} contacts)",
                self.state,
                tracker.len()
            );
        }
        self.state
    }

    /// Classify a move sample already applied to `tracker`.
    pub fn on_move(&mut self, tracker: &ContactTracker) -> Classified {
        if let Some(contact) = tracker.single() {
            self.state = GestureState::Rotate;
            return Classified::Rotate {
                position: contact.position,
                delta: contact.delta(),
            };
        }

        let Some((a, b)) = tracker.pair() else {
            self.state = GestureState::None;
            return Classified::Idle;
        };

        let current = PairAnchor::of(a, b);
        let last = self.anchor.unwrap_or(PairAnchor {
            distance: 0.0,
            midpoint: current.midpoint,
        });
        self.anchor = Some(current);

        let distance_change = current.distance - last.distance;
        if distance_change.abs() > self.pinch_threshold {
            self.state = GestureState::Pinch;
            Classified::Pinch {
                midpoint: current.midpoint,
                distance_change,
            }
        } else {
            self.state = GestureState::Pan;
            Classified::Pan {
                midpoint: current.midpoint,
                delta: current.midpoint - last.midpoint,
            }
        }
    }

    /// Forget all state.
    pub fn reset(&mut self) {
        self.state = GestureState::None;
        self.anchor = None;
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(5.0)
    }
}

#[cfg(test)]
mod tests {
    use web_time::Instant;

    use super::*;
    use crate::input::TouchPoint;

    fn pt(id: u64, x: f32, y: f32) -> TouchPoint {
        TouchPoint::new(id, x, y)
    }

    fn two_finger_setup() -> (ContactTracker, GestureClassifier, Instant) {
        let t0 = Instant::now();
        let mut tracker = ContactTracker::new();
        let mut classifier = GestureClassifier::default();
        tracker.ingest_start(&[pt(1, 100.0, 100.0), pt(2, 200.0, 100.0)], t0);
        assert_eq!(
            classifier.on_contacts_changed(&tracker),
            GestureState::Pinch
        );
        (tracker, classifier, t0)
    }

    #[test]
    fn one_contact_rotates_with_raw_delta() {
        let t0 = Instant::now();
        let mut tracker = ContactTracker::new();
        let mut classifier = GestureClassifier::default();
        tracker.ingest_start(&[pt(1, 0.0, 0.0)], t0);
        assert_eq!(
            classifier.on_contacts_changed(&tracker),
            GestureState::Rotate
        );

        for step in 1..=5 {
            let x = step as f32 * 3.0;
            let _ = tracker.ingest_move(&[pt(1, x, -x)], t0);
            assert_eq!(
                classifier.on_move(&tracker),
                Classified::Rotate {
                    position: Vec2::new(x, -x),
                    delta: Vec2::new(3.0, -3.0),
                }
            );
            assert_eq!(classifier.state(), GestureState::Rotate);
        }
    }

    #[test]
    fn closing_fingers_is_a_pinch() {
        let (mut tracker, mut classifier, t0) = two_finger_setup();
        let _ = tracker
            .ingest_move(&[pt(1, 125.0, 100.0), pt(2, 175.0, 100.0)], t0);
        assert_eq!(
            classifier.on_move(&tracker),
            Classified::Pinch {
                midpoint: Vec2::new(150.0, 100.0),
                distance_change: -50.0,
            }
        );
        assert_eq!(classifier.state(), GestureState::Pinch);
    }

    #[test]
    fn parallel_motion_is_a_pan() {
        let (mut tracker, mut classifier, t0) = two_finger_setup();
        let _ = tracker
            .ingest_move(&[pt(1, 120.0, 120.0), pt(2, 220.0, 120.0)], t0);
        assert_eq!(
            classifier.on_move(&tracker),
            Classified::Pan {
                midpoint: Vec2::new(170.0, 120.0),
                delta: Vec2::new(20.0, 20.0),
            }
        );
        assert_eq!(classifier.state(), GestureState::Pan);
    }

    #[test]
    fn threshold_is_exclusive_and_compares_previous_sample() {
        let (mut tracker, mut classifier, t0) = two_finger_setup();
        // Exactly 5 units: not a pinch.
        let _ = tracker.ingest_move(&[pt(2, 205.0, 100.0)], t0);
        assert!(matches!(classifier.on_move(&tracker), Classified::Pan { .. }));
        // Another 6 units relative to the previous sample: pinch.
        let _ = tracker.ingest_move(&[pt(2, 211.0, 100.0)], t0);
        assert!(matches!(
            classifier.on_move(&tracker),
            Classified::Pinch { .. }
        ));
        // Slow drift after that is judged per sample, so it is a pan again.
        let _ = tracker.ingest_move(&[pt(2, 214.0, 100.0)], t0);
        assert!(matches!(classifier.on_move(&tracker), Classified::Pan { .. }));
    }

    #[test]
    fn losing_a_finger_collapses_to_rotate_and_drops_anchor() {
        let (mut tracker, mut classifier, t0) = two_finger_setup();
        let _ = tracker.ingest_end([2]);
        assert_eq!(
            classifier.on_contacts_changed(&tracker),
            GestureState::Rotate
        );

        // A new second finger re-anchors instead of comparing to the old pair.
        tracker.ingest_start(&[pt(3, 100.0, 300.0)], t0);
        assert_eq!(
            classifier.on_contacts_changed(&tracker),
            GestureState::Pinch
        );
        let _ = tracker.ingest_move(&[pt(3, 102.0, 302.0)], t0);
        assert!(matches!(classifier.on_move(&tracker), Classified::Pan { .. }));

        let _ = tracker.ingest_end([1, 3]);
        assert_eq!(
            classifier.on_contacts_changed(&tracker),
            GestureState::None
        );
    }

    #[test]
    fn three_contacts_produce_no_gesture() {
        let (mut tracker, mut classifier, t0) = two_finger_setup();
        tracker.ingest_start(&[pt(3, 0.0, 0.0)], t0);
        assert_eq!(
            classifier.on_contacts_changed(&tracker),
            GestureState::None
        );
        let _ = tracker.ingest_move(&[pt(3, 50.0, 0.0)], t0);
        assert_eq!(classifier.on_move(&tracker), Classified::Idle);
    }
}
