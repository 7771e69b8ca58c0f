use glam::Vec2;
use serde::{Deserialize, Serialize};
use web_time::Instant;

/// Stable identifier of one touch contact for its whole lifetime.
pub type ContactId = u64;

/// One contact position inside a [`TouchEvent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Contact identifier assigned by the platform.
    pub id: ContactId,
    /// Screen position in physical pixels.
    pub position: Vec2,
}

impl TouchPoint {
    /// Contact `id` at screen position (`x`, `y`).
    #[must_use]
    pub fn new(id: ContactId, x: f32, y: f32) -> Self {
        Self {
            id,
            position: Vec2::new(x, y),
        }
    }
}

/// Which part of a contact's lifetime a [`TouchEvent`] reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    /// Contacts touched down.
    Start,
    /// Contacts moved.
    Move,
    /// Contacts lifted.
    End,
    /// The platform aborted the contacts (e.g. a system gesture took over).
    Cancel,
}

/// Platform-agnostic touch sample.
///
/// Carries only the contacts that changed, like `changedTouches` on the web
/// or a single winit `Touch`. Feed these, in arrival order, into the
/// [`CameraGestureEngine`](crate::camera::CameraGestureEngine) and the
/// [`BlockEditGestureController`](crate::edit::BlockEditGestureController).
///
/// # Example
///
/// ```
/// use tactus::input::{TouchEvent, TouchPoint};
/// use web_time::Instant;
///
/// let point = TouchPoint::new(1, 10.0, 20.0);
/// let event = TouchEvent::start(vec![point], Instant::now());
/// assert_eq!(event.points.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    /// Lifetime phase shared by every point in this event.
    pub phase: TouchPhase,
    /// The contacts that changed.
    pub points: Vec<TouchPoint>,
    /// When the platform observed the change.
    pub at: Instant,
}

impl TouchEvent {
    /// Contacts touched down.
    #[must_use]
    pub fn start(points: Vec<TouchPoint>, at: Instant) -> Self {
        Self {
            phase: TouchPhase::Start,
            points,
            at,
        }
    }

    /// Contacts moved.
    #[must_use]
    pub fn moved(points: Vec<TouchPoint>, at: Instant) -> Self {
        Self {
            phase: TouchPhase::Move,
            points,
            at,
        }
    }

    /// Contacts lifted at their final positions.
    #[must_use]
    pub fn end(points: Vec<TouchPoint>, at: Instant) -> Self {
        Self {
            phase: TouchPhase::End,
            points,
            at,
        }
    }

    /// Contacts aborted by the platform.
    #[must_use]
    pub fn cancel(points: Vec<TouchPoint>, at: Instant) -> Self {
        Self {
            phase: TouchPhase::Cancel,
            points,
            at,
        }
    }

    /// Identifiers of the contacts in this event.
    pub fn ids(&self) -> impl Iterator<Item = ContactId> + '_ {
        self.points.iter().map(|p| p.id)
    }

    /// Whether this event ends its contacts (lift or cancel).
    #[must_use]
    pub fn is_release(&self) -> bool {
        matches!(self.phase, TouchPhase::End | TouchPhase::Cancel)
    }
}

#[cfg(feature = "winit")]
impl TouchEvent {
    /// Convert a winit touch, stamped with the time it was received.
    #[must_use]
    pub fn from_winit(touch: &winit::event::Touch, at: Instant) -> Self {
        let phase = match touch.phase {
            winit::event::TouchPhase::Started => TouchPhase::Start,
            winit::event::TouchPhase::Moved => TouchPhase::Move,
            winit::event::TouchPhase::Ended => TouchPhase::End,
            winit::event::TouchPhase::Cancelled => TouchPhase::Cancel,
        };
        Self {
            phase,
            points: vec![TouchPoint::new(
                touch.id,
                touch.location.x as f32,
                touch.location.y as f32,
            )],
            at,
        }
    }
}

#[cfg(feature = "web")]
impl TouchEvent {
    /// Convert a DOM touch event using its changed touches.
    ///
    /// Returns `None` for event types other than
    /// `touchstart`/`touchmove`/`touchend`/`touchcancel`.
    #[must_use]
    pub fn from_web(event: &web_sys::TouchEvent, at: Instant) -> Option<Self> {
        let phase = match event.type_().as_str() {
            "touchstart" => TouchPhase::Start,
            "touchmove" => TouchPhase::Move,
            "touchend" => TouchPhase::End,
            "touchcancel" => TouchPhase::Cancel,
            _ => return None,
        };
        let touches = event.changed_touches();
        let points = (0..touches.length())
            .filter_map(|i| touches.get(i))
            .map(|touch| {
                TouchPoint::new(
                    u64::from(touch.identifier() as u32),
                    touch.client_x() as f32,
                    touch.client_y() as f32,
                )
            })
            .collect();
        Some(Self { phase, points, at })
    }
}
