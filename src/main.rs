//! `tactus-replay`: run a recorded touch trace through the gesture
//! controllers and print what they did.
//!
//! ```text
//! tactus-replay <trace.json> [options.toml]
//! ```
//!
//! The trace is a JSON object with an `events` array; each event has a
//! millisecond timestamp `t_ms`, a `phase` (`start`, `move`, `end`,
//! `cancel`) and the changed `contacts` as `{id, x, y}`. Both controllers
//! are driven with a 60 Hz frame clock, and a JSON report of camera
//! commands, world edits and gesture events is written to stdout.

use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tactus::camera::momentum::REFERENCE_FRAME;
use tactus::camera::{CameraCommand, CameraGestureEngine};
use tactus::edit::{BlockEditGestureController, GridWorld, WorldEdit};
use tactus::error::TactusError;
use tactus::events::{GestureEvent, GestureKind};
use tactus::input::{TouchEvent, TouchPhase, TouchPoint};
use tactus::options::GestureOptions;
use tactus::schedule::FrameScheduler;
use web_time::{Duration, Instant};

/// How long momentum and timers may keep running after the last event.
const SETTLE_LIMIT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct Trace {
    /// Block placed by taps on empty space.
    #[serde(default = "default_selection")]
    selection: String,
    /// Edit grid cell size in pixels.
    #[serde(default = "default_cell_size")]
    cell_size: f32,
    events: Vec<TraceEvent>,
}

fn default_selection() -> String {
    "block".to_owned()
}

const fn default_cell_size() -> f32 {
    32.0
}

#[derive(Debug, Deserialize)]
struct TraceEvent {
    t_ms: u64,
    phase: TouchPhase,
    contacts: Vec<TraceContact>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct TraceContact {
    id: u64,
    x: f32,
    y: f32,
}

impl TraceEvent {
    fn to_touch_event(&self, at: Instant) -> TouchEvent {
        TouchEvent {
            phase: self.phase,
            points: self
                .contacts
                .iter()
                .map(|c| TouchPoint::new(c.id, c.x, c.y))
                .collect(),
            at,
        }
    }
}

#[derive(Debug, Serialize)]
struct Stamped<T> {
    t_ms: f64,
    #[serde(flatten)]
    value: T,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    events: usize,
    duration_ms: f64,
    blocks: usize,
    settled: bool,
}

#[derive(Debug, Default, Serialize)]
struct Report {
    camera: Vec<Stamped<CameraCommand>>,
    edits: Vec<Stamped<WorldEdit<String>>>,
    gestures: Vec<Stamped<GestureEvent>>,
    summary: Summary,
}

/// Both controllers plus everything they produced so far.
struct Session {
    camera: CameraGestureEngine<Vec<CameraCommand>, FrameScheduler>,
    editor: BlockEditGestureController<GridWorld<String>, FrameScheduler>,
    heard: Rc<RefCell<Vec<GestureEvent>>>,
    t0: Instant,
    report: Report,
}

impl Session {
    fn new(trace: &Trace, options: &GestureOptions, t0: Instant) -> Self {
        let mut camera = CameraGestureEngine::with_options(
            Vec::new(),
            FrameScheduler::new(),
            options,
        );
        let mut editor = BlockEditGestureController::with_options(
            GridWorld::new(trace.cell_size),
            FrameScheduler::new(),
            trace.selection.clone(),
            options,
        );
        editor.set_haptic_sink(|pulse: Duration| {
            log::info!("haptic pulse {pulse:?}");
        });

        let heard = Rc::new(RefCell::new(Vec::new()));
        for kind in [GestureKind::Drag, GestureKind::Pinch] {
            let sink = Rc::clone(&heard);
            let _ = camera.subscribe(kind, move |e| sink.borrow_mut().push(*e));
        }
        for kind in [GestureKind::Tap, GestureKind::LongPress] {
            let sink = Rc::clone(&heard);
            let _ = editor.subscribe(kind, move |e| sink.borrow_mut().push(*e));
        }

        Self {
            camera,
            editor,
            heard,
            t0,
            report: Report::default(),
        }
    }

    fn handle(&mut self, event: &TouchEvent) {
        self.camera.handle_event(event);
        self.editor.handle_event(event);
        self.collect(event.at);
    }

    fn advance(&mut self, now: Instant) {
        self.camera.advance(now);
        self.editor.advance(now);
        self.collect(now);
    }

    fn is_idle(&self) -> bool {
        self.camera.scheduler().is_idle() && self.editor.scheduler().is_idle()
    }

    fn collect(&mut self, at: Instant) {
        let t_ms = at.saturating_duration_since(self.t0).as_secs_f64() * 1000.0;
        self.report.camera.extend(
            std::mem::take(self.camera.sink_mut())
                .into_iter()
                .map(|value| Stamped { t_ms, value }),
        );
        self.report.edits.extend(
            self.editor
                .world_mut()
                .take_edits()
                .into_iter()
                .map(|value| Stamped { t_ms, value }),
        );
        self.report.gestures.extend(
            self.heard
                .borrow_mut()
                .drain(..)
                .map(|value| Stamped { t_ms, value }),
        );
    }

    fn finish(mut self, events: usize, end: Instant) -> Report {
        self.report.summary = Summary {
            events,
            duration_ms: end.saturating_duration_since(self.t0).as_secs_f64()
                * 1000.0,
            blocks: self.editor.world().len(),
            settled: self.is_idle(),
        };
        self.camera.destroy();
        self.editor.destroy();
        self.report
    }
}

fn parse_trace(content: &str) -> Result<Trace, TactusError> {
    serde_json::from_str(content)
        .map_err(|e| TactusError::TraceParse(e.to_string()))
}

fn load_trace(path: &Path) -> Result<Trace, TactusError> {
    let content = fs::read_to_string(path)?;
    parse_trace(&content)
}

/// Replay `trace`, stepping frames at 60 Hz between events and after the
/// last one until every scheduler is idle (or [`SETTLE_LIMIT`] passes).
fn replay(trace: &Trace, options: &GestureOptions) -> Report {
    let t0 = Instant::now();
    let mut session = Session::new(trace, options, t0);
    let mut clock = t0;

    for event in &trace.events {
        let at = t0 + Duration::from_millis(event.t_ms);
        while clock + REFERENCE_FRAME <= at {
            clock += REFERENCE_FRAME;
            session.advance(clock);
        }
        session.handle(&event.to_touch_event(at));
    }

    let give_up = clock + SETTLE_LIMIT;
    while !session.is_idle() && clock < give_up {
        clock += REFERENCE_FRAME;
        session.advance(clock);
    }
    if !session.is_idle() {
        log::warn!("controllers still busy {SETTLE_LIMIT:?} after the trace");
    }
    session.finish(trace.events.len(), clock)
}

fn run(trace_path: &Path, options: &GestureOptions) -> Result<(), TactusError> {
    let trace = load_trace(trace_path)?;
    log::info!(
        "replaying {} events from {}",
        trace.events.len(),
        trace_path.display()
    );
    let report = replay(&trace, options);
    log::info!(
        "{} camera commands, {} edits, {} gestures",
        report.camera.len(),
        report.edits.len(),
        report.gestures.len()
    );

    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &report).map_err(io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(trace_path) = args.next() else {
        log::error!("Usage: tactus-replay <trace.json> [options.toml]");
        std::process::exit(1);
    };

    let options = match args.next() {
        Some(path) => match GestureOptions::load(Path::new(&path)) {
            Ok(options) => options,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => GestureOptions::default(),
    };

    if let Err(e) = run(Path::new(&trace_path), &options) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
