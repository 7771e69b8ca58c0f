//! Host scheduling seam.
//!
//! Recognizers never block or spawn. Anything that must happen later (the
//! next momentum frame, a long-press deadline, a feedback marker expiring)
//! is requested from a [`Scheduler`] under a fresh [`ScheduleToken`]. The
//! host reports the wakeup back with that token, and the owner ignores any
//! token it no longer holds, so a cancelled callback that fires anyway is
//! harmless.

use web_time::Instant;

/// Opaque handle naming one scheduled callback.
///
/// Tokens come from a per-owner generation counter and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScheduleToken(u64);

impl ScheduleToken {
    /// Raw generation number, for hosts that key their own tables by it.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Monotonic token generator owned by each controller.
///
/// Owners that share a scheduler mint from different lanes; the lane sits in
/// the top byte so their tokens never collide.
#[derive(Debug, Default)]
pub(crate) struct TokenSource {
    lane: u8,
    next: u64,
}

impl TokenSource {
    pub(crate) fn lane(lane: u8) -> Self {
        Self { lane, next: 0 }
    }

    pub(crate) fn mint(&mut self) -> ScheduleToken {
        self.next += 1;
        ScheduleToken((u64::from(self.lane) << 56) | self.next)
    }
}

/// What the host must provide: "call me next frame" and "call me at".
///
/// Both are cancel-then-forget. After `cancel_*` the host should drop the
/// request, but owners tolerate a late wakeup.
pub trait Scheduler {
    /// Wake the owner on the next display frame.
    fn request_frame(&mut self, token: ScheduleToken);
    /// Drop a pending frame request.
    fn cancel_frame(&mut self, token: ScheduleToken);
    /// Wake the owner once `deadline` has passed.
    fn set_timer(&mut self, token: ScheduleToken, deadline: Instant);
    /// Drop a pending timer.
    fn cancel_timer(&mut self, token: ScheduleToken);
}

/// A due callback returned by [`FrameScheduler::take_due`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// A frame requested with [`Scheduler::request_frame`].
    Frame(ScheduleToken),
    /// A timer set with [`Scheduler::set_timer`] whose deadline passed.
    Timer(ScheduleToken),
}

/// Scheduler for hosts that already run a render loop.
///
/// Requests are queued; the host calls [`take_due`](Self::take_due) once
/// per frame and hands the wakeups back to the owning controller (the
/// controllers' `advance` methods do exactly that).
#[derive(Debug, Default)]
pub struct FrameScheduler {
    frames: Vec<ScheduleToken>,
    timers: Vec<(ScheduleToken, Instant)>,
}

impl FrameScheduler {
    /// Empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain every pending frame plus each timer due at `now`.
    ///
    /// Frames come first, then timers in deadline order. Anything requested
    /// while the returned wakeups are being handled waits for the next call.
    pub fn take_due(&mut self, now: Instant) -> Vec<Wakeup> {
        let mut due: Vec<Wakeup> =
            self.frames.drain(..).map(Wakeup::Frame).collect();

        let mut expired: Vec<(ScheduleToken, Instant)> = Vec::new();
        self.timers.retain(|&(token, deadline)| {
            if deadline <= now {
                expired.push((token, deadline));
                false
            } else {
                true
            }
        });
        expired.sort_by_key(|&(token, deadline)| (deadline, token));
        due.extend(expired.into_iter().map(|(token, _)| Wakeup::Timer(token)));
        due
    }

    /// Number of frame requests waiting.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of timers waiting.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Whether nothing is scheduled.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.frames.is_empty() && self.timers.is_empty()
    }
}

impl Scheduler for FrameScheduler {
    fn request_frame(&mut self, token: ScheduleToken) {
        if !self.frames.contains(&token) {
            self.frames.push(token);
        }
    }

    fn cancel_frame(&mut self, token: ScheduleToken) {
        self.frames.retain(|&t| t != token);
    }

    fn set_timer(&mut self, token: ScheduleToken, deadline: Instant) {
        self.timers.retain(|&(t, _)| t != token);
        self.timers.push((token, deadline));
    }

    fn cancel_timer(&mut self, token: ScheduleToken) {
        self.timers.retain(|&(t, _)| t != token);
    }
}
