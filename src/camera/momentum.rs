//! Post-release rotation momentum.
//!
//! While one finger drags, every sample is recorded. When it lifts, the
//! last two samples give an exit velocity (pixels per 60 Hz frame). Each
//! following display frame multiplies that velocity by the friction factor
//! and rotates by how much it shrank, until both axes fall under the
//! minimum velocity.

use glam::Vec2;
use web_time::{Duration, Instant};

use crate::options::MomentumOptions;
use crate::schedule::{ScheduleToken, Scheduler, TokenSource};

/// Frame length velocities are normalised to (60 Hz).
pub const REFERENCE_FRAME: Duration = Duration::from_micros(16_667);

/// Token lane for momentum frames, apart from tap timers (0) and touch
/// marker timers (1).
const MOMENTUM_LANE: u8 = 2;

/// Per-frame rotation smaller than this on both axes is not issued.
const STEP_EPSILON: f32 = 1e-3;

/// One drag sample: movement and when it happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocitySample {
    /// Movement since the previous sample.
    pub delta: Vec2,
    /// Sample time.
    pub at: Instant,
}

/// Drives the decaying rotation after a one-finger drag is released.
#[derive(Debug)]
pub struct MomentumIntegrator {
    options: MomentumOptions,
    /// Latest sample and the gap that preceded it.
    last: Option<(VelocitySample, Option<Duration>)>,
    velocity: Vec2,
    pending: Option<ScheduleToken>,
    tokens: TokenSource,
}

impl MomentumIntegrator {
    /// Idle integrator.
    #[must_use]
    pub fn new(options: MomentumOptions) -> Self {
        Self {
            options,
            last: None,
            velocity: Vec2::ZERO,
            pending: None,
            tokens: TokenSource::lane(MOMENTUM_LANE),
        }
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &MomentumOptions {
        &self.options
    }

    /// Replace the options. Does not affect a session already running
    /// except through friction and threshold on later frames.
    pub fn set_options(&mut self, options: MomentumOptions) {
        self.options = options;
    }

    /// Turn momentum on or off. Turning it off stops a running session.
    pub fn set_enabled(
        &mut self,
        enabled: bool,
        scheduler: &mut dyn Scheduler,
    ) {
        self.options.enabled = enabled;
        if !enabled {
            self.cancel(scheduler);
        }
    }

    /// Whether a session is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    /// Current velocity in pixels per reference frame.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// A drag started (or resumed with one finger) at `at`: forget older
    /// samples and anchor here with zero velocity.
    pub fn begin_tracking(&mut self, at: Instant) {
        self.last = Some((
            VelocitySample {
                delta: Vec2::ZERO,
                at,
            },
            None,
        ));
    }

    /// Record a drag sample.
    pub fn record(&mut self, delta: Vec2, at: Instant) {
        let gap = self
            .last
            .map(|(prev, _)| at.saturating_duration_since(prev.at));
        self.last = Some((VelocitySample { delta, at }, gap));
    }

    /// Exit velocity if the drag were released at `at`.
    ///
    /// A sample gap over `max_sample_gap` (between the last two samples, or
    /// between the last sample and the release) means the finger had
    /// stopped, so the velocity resyncs to zero.
    #[must_use]
    pub fn release_velocity(&self, at: Instant) -> Vec2 {
        let Some((sample, Some(gap))) = self.last else {
            return Vec2::ZERO;
        };
        let max_gap = self.options.max_sample_gap();
        let since_last = at.saturating_duration_since(sample.at);
        if gap > max_gap || since_last > max_gap {
            log::debug!(
                "momentum resync: gap {gap:?}, since last {since_last:?}"
            );
            return Vec2::ZERO;
        }
        if gap.is_zero() {
            return sample.delta;
        }
        sample.delta * (REFERENCE_FRAME.as_secs_f32() / gap.as_secs_f32())
    }

    /// The last contact of a rotate drag lifted at `at`. Starts a session
    /// (requesting the first frame) when momentum is enabled and the exit
    /// velocity is above the threshold. Returns whether it started.
    pub fn release(
        &mut self,
        at: Instant,
        scheduler: &mut dyn Scheduler,
    ) -> bool {
        let velocity = self.release_velocity(at);
        self.last = None;
        if !self.options.enabled || self.below_threshold(velocity) {
            return false;
        }
        self.cancel(scheduler);
        self.velocity = velocity;
        self.schedule(scheduler);
        log::debug!("momentum start at {velocity:?}");
        true
    }

    /// Advance one frame. Returns the unscaled rotation to issue, if any.
    /// Tokens other than the pending one are stale and ignored.
    pub fn on_frame(
        &mut self,
        token: ScheduleToken,
        scheduler: &mut dyn Scheduler,
    ) -> Option<Vec2> {
        if self.pending != Some(token) {
            log::trace!("stale momentum frame {}", token.raw());
            return None;
        }
        self.pending = None;

        let prior = self.velocity;
        self.velocity *= self.options.friction;
        if self.below_threshold(self.velocity) {
            log::debug!("momentum settled");
            self.velocity = Vec2::ZERO;
            return None;
        }

        self.schedule(scheduler);
        let step = prior - self.velocity;
        (step.x.abs() > STEP_EPSILON || step.y.abs() > STEP_EPSILON)
            .then_some(step)
    }

    /// Stop the session and forget all samples. Safe to call at any time.
    pub fn cancel(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(token) = self.pending.take() {
            scheduler.cancel_frame(token);
            log::debug!("momentum cancelled");
        }
        self.velocity = Vec2::ZERO;
        self.last = None;
    }

    fn schedule(&mut self, scheduler: &mut dyn Scheduler) {
        let token = self.tokens.mint();
        self.pending = Some(token);
        scheduler.request_frame(token);
    }

    fn below_threshold(&self, velocity: Vec2) -> bool {
        velocity.x.abs() < self.options.min_velocity
            && velocity.y.abs() < self.options.min_velocity
    }
}

impl Default for MomentumIntegrator {
    fn default() -> Self {
        Self::new(MomentumOptions::default())
    }
}
