//! Live contact bookkeeping shared by every recognizer.

use glam::Vec2;
use rustc_hash::FxHashMap;
use web_time::Instant;

use super::event::{ContactId, TouchPoint};

/// One tracked touch contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Platform identifier.
    pub id: ContactId,
    /// Latest position.
    pub position: Vec2,
    /// Position before the latest move sample.
    pub previous: Vec2,
    /// Where the contact touched down.
    pub origin: Vec2,
    /// Touch-down time.
    pub started_at: Instant,
    /// Time of the latest sample.
    pub updated_at: Instant,
}

impl Contact {
    fn new(point: TouchPoint, at: Instant) -> Self {
        Self {
            id: point.id,
            position: point.position,
            previous: point.position,
            origin: point.position,
            started_at: at,
            updated_at: at,
        }
    }

    /// Movement reported by the latest sample.
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.position - self.previous
    }

    /// Straight-line distance from the touch-down point.
    #[must_use]
    pub fn displacement(&self) -> f32 {
        self.position.distance(self.origin)
    }
}

/// The live set of contacts, keyed by id.
///
/// Malformed input is absorbed: moves and ends for ids that were never
/// started are ignored.
#[derive(Debug, Default)]
pub struct ContactTracker {
    contacts: FxHashMap<ContactId, Contact>,
}

impl ContactTracker {
    /// Empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record newly touched-down contacts.
    ///
    /// A start for an id that is already tracked restarts that contact.
    pub fn ingest_start(&mut self, points: &[TouchPoint], at: Instant) {
        for point in points {
            let _ = self.contacts.insert(point.id, Contact::new(*point, at));
        }
    }

    /// Apply a move sample. Returns how many tracked contacts moved.
    pub fn ingest_move(&mut self, points: &[TouchPoint], at: Instant) -> usize {
        let mut moved = 0;
        for point in points {
            if let Some(contact) = self.contacts.get_mut(&point.id) {
                contact.previous = contact.position;
                contact.position = point.position;
                contact.updated_at = at;
                moved += 1;
            } else {
                log::trace!("move for unknown contact {}", point.id);
            }
        }
        moved
    }

    /// Drop ended or cancelled contacts, returning the ones that were
    /// tracked. Unknown ids are ignored.
    pub fn ingest_end(
        &mut self,
        ids: impl IntoIterator<Item = ContactId>,
    ) -> Vec<Contact> {
        ids.into_iter()
            .filter_map(|id| {
                let removed = self.contacts.remove(&id);
                if removed.is_none() {
                    log::trace!("end for unknown contact {id}");
                }
                removed
            })
            .collect()
    }

    /// Number of active contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Whether no contact is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Look up an active contact.
    #[must_use]
    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.get(&id)
    }

    /// The only active contact, if exactly one is down.
    #[must_use]
    pub fn single(&self) -> Option<&Contact> {
        if self.contacts.len() == 1 {
            self.contacts.values().next()
        } else {
            None
        }
    }

    /// The two active contacts ordered by id, if exactly two are down.
    #[must_use]
    pub fn pair(&self) -> Option<(&Contact, &Contact)> {
        if self.contacts.len() != 2 {
            return None;
        }
        let mut it = self.contacts.values();
        let (a, b) = (it.next()?, it.next()?);
        if a.id <= b.id {
            Some((a, b))
        } else {
            Some((b, a))
        }
    }

    /// Iterate over all active contacts (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.values()
    }

    /// Forget every contact.
    pub fn clear(&mut self) {
        self.contacts.clear();
    }
}
