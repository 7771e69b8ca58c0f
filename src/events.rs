//! Gesture events and per-controller listener registries.

use std::panic::{self, AssertUnwindSafe};

use glam::Vec2;
use serde::Serialize;

/// Category of [`GestureEvent`] a listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    /// Short press-and-release.
    Tap,
    /// Press held past the long-press duration.
    LongPress,
    /// One-finger rotate drag or two-finger pan.
    Drag,
    /// Two-finger pinch.
    Pinch,
}

/// A recognised gesture, delivered to subscribed listeners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
pub enum GestureEvent {
    /// A tap resolved at `position`.
    Tap {
        /// Release position in screen pixels.
        position: Vec2,
    },
    /// A long press fired at `position`.
    LongPress {
        /// Contact position when the hold duration elapsed.
        position: Vec2,
    },
    /// The drag point moved by `delta` (unscaled pixels).
    Drag {
        /// Current contact (or two-contact midpoint) position.
        position: Vec2,
        /// Movement since the previous sample.
        delta: Vec2,
    },
    /// The distance between two contacts changed.
    Pinch {
        /// Midpoint between the two contacts.
        midpoint: Vec2,
        /// Change in finger distance since the previous sample (negative
        /// when pinching in).
        distance_change: f32,
    },
}

impl GestureEvent {
    /// The subscription category this event belongs to.
    #[must_use]
    pub fn kind(&self) -> GestureKind {
        match self {
            Self::Tap { .. } => GestureKind::Tap,
            Self::LongPress { .. } => GestureKind::LongPress,
            Self::Drag { .. } => GestureKind::Drag,
            Self::Pinch { .. } => GestureKind::Pinch,
        }
    }
}

/// Opaque handle returned by `subscribe`; pass it to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use = "dropping the handle makes the listener impossible to remove"]
pub struct ListenerHandle(u64);

type Callback = Box<dyn FnMut(&GestureEvent)>;

struct Entry {
    handle: ListenerHandle,
    kind: GestureKind,
    callback: Callback,
}

/// Listener list owned by one controller instance.
#[derive(Default)]
pub(crate) struct Listeners {
    next: u64,
    entries: Vec<Entry>,
}

impl Listeners {
    pub(crate) fn subscribe(
        &mut self,
        kind: GestureKind,
        callback: impl FnMut(&GestureEvent) + 'static,
    ) -> ListenerHandle {
        self.next += 1;
        let handle = ListenerHandle(self.next);
        self.entries.push(Entry {
            handle,
            kind,
            callback: Box::new(callback),
        });
        handle
    }

    pub(crate) fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Deliver `event` to every listener of its kind, in subscription
    /// order. A panicking listener is logged and skipped; the rest still
    /// run. Returns how many listeners failed.
    pub(crate) fn emit(&mut self, event: &GestureEvent) -> usize {
        let kind = event.kind();
        let mut failures = 0;
        for entry in self.entries.iter_mut().filter(|e| e.kind == kind) {
            let callback = &mut entry.callback;
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| callback(event)));
            if outcome.is_err() {
                failures += 1;
                log::error!(
                    "{kind:?} listener {} panicked; continuing",
                    entry.handle.0
                );
            }
        }
        failures
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}
