//! Session lifecycle: start/stop, periodic sampling, verdict.
//!
//! ```text
//!            start (begin_acquisition, reset)
//!   Idle  ───────────────────────────────▶  Collecting ──┐
//!    ▲                                           │       │ tick: fetch → classify
//!    └───────────────────────────────────────────┘ ◀─────┘       → window → record
//!            stop (cancel timer, end_acquisition, finalize)
//! ```
//!
//! The sensor source sits behind its own mutex, separate from the session
//! state. A tick holds the source lock for the fetch, so ticks are single
//! flight, and takes the session lock only to commit classify, append and
//! record together. Readers (`snapshot`, `verdict`, `state`) never wait on
//! a fetch.
//!
//! `stop` first closes the session to new commits, then cancels and joins
//! the sampling thread and calls `end_acquisition` while the state still
//! reads Collecting. The switch to Idle and the stored report are published
//! in one critical section.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregator::{SessionAggregator, SessionCounts, Verdict};
use crate::classifier::{ClassificationResult, Severity, classify};
use crate::config::MonitorConfig;
use crate::error::{AcquisitionError, MonitorError, Result};
use crate::ranges::{RangeTable, SpeedLevel};
use crate::sample::{AccelReading, Sample, format_iso8601, now_ms};
use crate::source::{AcquisitionControl, ModelPrediction, SensorSource};
use crate::window::SampleWindow;

/// Granularity at which the sampling thread checks for cancellation.
const CANCEL_POLL: Duration = Duration::from_millis(10);

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerState {
    Idle,
    Collecting,
}

impl std::fmt::Display for ControllerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Collecting => write!(f, "collecting"),
        }
    }
}

/// How ticks are issued while collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// A sampling thread ticks once per interval.
    Periodic(Duration),
    /// The caller drives ticks with [`CollectionController::tick`].
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started { session_id: String },
    AlreadyCollecting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A sample was classified, appended and recorded.
    Recorded(ClassificationResult),
    /// The fetch failed; nothing was mutated.
    Skipped(AcquisitionError),
    /// No session is accepting samples.
    Inactive,
}

/// Summary of one stopped session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: String,
    pub speed_level: SpeedLevel,
    pub source: String,
    pub started_at: String,
    pub ended_at: String,
    pub duration_ms: u64,
    pub recorded: u64,
    pub skipped: u64,
    pub verdict: Verdict,
    /// External model output, when the end call succeeded with a valid prediction.
    pub prediction: Option<ModelPrediction>,
    pub vibewatch_version: String,
}

/// Live status line for the most recent classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveStatus {
    pub severity: Severity,
    pub description: String,
    pub recommendation: String,
}

/// Read-only view for display surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    pub state: ControllerState,
    pub session_id: Option<String>,
    pub speed_level: SpeedLevel,
    pub window: Vec<Sample>,
    pub last_classification: Option<ClassificationResult>,
    pub status: Option<LiveStatus>,
    pub counts: SessionCounts,
    pub risk_index: f64,
    pub recorded: u64,
    pub skipped: u64,
    pub last_report: Option<SessionReport>,
}

struct Session {
    state: ControllerState,
    /// False once `stop` has begun; late fetches are discarded.
    accepting: bool,
    /// Bumped on every start so a fetch never lands in a later session.
    generation: u64,
    session_id: Option<String>,
    started_at_ms: u64,
    started: Instant,
    window: SampleWindow,
    aggregator: SessionAggregator,
    last_result: Option<ClassificationResult>,
    recorded: u64,
    skipped: u64,
    last_report: Option<SessionReport>,
}

impl Session {
    fn open_generation(&self) -> Option<u64> {
        (self.state == ControllerState::Collecting && self.accepting).then_some(self.generation)
    }

    fn commit(&mut self, reading: AccelReading, table: &RangeTable) -> ClassificationResult {
        let sample = Sample::from_reading(reading);
        let result = classify(&sample, table);
        self.window.append(sample);
        self.aggregator.record(result.severity);
        self.last_result = Some(result);
        self.recorded += 1;

        log::debug!(
            "sample #{} ({:.2}, {:.2}, {:.2}) -> {}{}",
            self.recorded,
            sample.accel_x,
            sample.accel_y,
            sample.accel_z,
            result.severity,
            result
                .axis_triggered
                .map(|a| format!(" on {a}"))
                .unwrap_or_default()
        );
        result
    }
}

/// State shared between the controller and its sampling thread.
struct Shared {
    session: Mutex<Session>,
    source: Mutex<Box<dyn SensorSource>>,
    table: Arc<RangeTable>,
}

impl Shared {
    fn tick(&self) -> TickOutcome {
        let mut source = lock(&self.source);
        let Some(generation) = lock(&self.session).open_generation() else {
            return TickOutcome::Inactive;
        };

        let fetched = fetch(&mut **source);

        let mut session = lock(&self.session);
        if session.open_generation() != Some(generation) {
            log::debug!("discarding fetch: session closed while reading");
            return TickOutcome::Inactive;
        }
        match fetched {
            Ok(reading) => TickOutcome::Recorded(session.commit(reading, &self.table)),
            Err(e) => {
                session.skipped += 1;
                log::warn!(
                    "skipping tick: {} fetch failed: {e} ({} skipped this session)",
                    source.name(),
                    session.skipped
                );
                TickOutcome::Skipped(e)
            }
        }
    }
}

/// Fetch one reading, turning panics and non-finite values into
/// recoverable errors.
fn fetch(source: &mut dyn SensorSource) -> std::result::Result<AccelReading, AcquisitionError> {
    let reading = catch_unwind(AssertUnwindSafe(|| source.read_accel())).unwrap_or_else(|_| {
        Err(AcquisitionError::Unavailable(
            "sensor source panicked".to_string(),
        ))
    })?;
    if !(reading.x.is_finite() && reading.y.is_finite() && reading.z.is_finite()) {
        return Err(AcquisitionError::Malformed(format!(
            "non-finite reading ({}, {}, {})",
            reading.x, reading.y, reading.z
        )));
    }
    Ok(reading)
}

struct Ticker {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Ticks that fire while no session is open are no-ops; only `cancel`
    /// ends the thread.
    fn spawn(shared: Arc<Shared>, interval: Duration) -> std::io::Result<Self> {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let handle = std::thread::Builder::new()
            .name("vibewatch-sampler".to_string())
            .spawn(move || {
                loop {
                    let deadline = Instant::now() + interval;
                    while Instant::now() < deadline && !flag.load(Ordering::SeqCst) {
                        let left = deadline.saturating_duration_since(Instant::now());
                        std::thread::sleep(left.min(CANCEL_POLL));
                    }
                    if flag.load(Ordering::SeqCst) {
                        break;
                    }
                    shared.tick();
                }
            })?;
        Ok(Self { cancel, handle })
    }

    /// Signal the thread and wait for any in-flight tick to finish.
    fn cancel(self) {
        self.cancel.store(true, Ordering::SeqCst);
        if self.handle.join().is_err() {
            log::error!("sampling thread panicked");
        }
    }
}

struct Lifecycle {
    acquisition: Box<dyn AcquisitionControl>,
    ticker: Option<Ticker>,
}

/// Owns one monitored appliance: its thresholds, collaborators, window and
/// session tally.
///
/// Methods take `&self`; the controller is `Send + Sync` and can be shared
/// behind an `Arc` between a display surface and a control surface.
pub struct CollectionController {
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
    source_name: String,
    speed_level: SpeedLevel,
    schedule: Schedule,
}

impl CollectionController {
    pub fn new(
        speed_level: SpeedLevel,
        table: RangeTable,
        source: Box<dyn SensorSource>,
        acquisition: Box<dyn AcquisitionControl>,
        schedule: Schedule,
    ) -> Self {
        let session = Session {
            state: ControllerState::Idle,
            accepting: false,
            generation: 0,
            session_id: None,
            started_at_ms: 0,
            started: Instant::now(),
            window: SampleWindow::new(),
            aggregator: SessionAggregator::new(),
            last_result: None,
            recorded: 0,
            skipped: 0,
            last_report: None,
        };
        Self {
            source_name: source.name().to_string(),
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                source: Mutex::new(source),
                table: Arc::new(table),
            }),
            lifecycle: Mutex::new(Lifecycle {
                acquisition,
                ticker: None,
            }),
            speed_level,
            schedule,
        }
    }

    /// Periodic controller using the config's table and polling interval.
    pub fn from_config(
        config: &MonitorConfig,
        source: Box<dyn SensorSource>,
        acquisition: Box<dyn AcquisitionControl>,
    ) -> Self {
        Self::new(
            config.speed_level,
            config.range_table(),
            source,
            acquisition,
            Schedule::Periodic(config.poll_interval()),
        )
    }

    pub fn state(&self) -> ControllerState {
        lock(&self.shared.session).state
    }

    pub fn is_collecting(&self) -> bool {
        self.state() == ControllerState::Collecting
    }

    pub fn table(&self) -> &RangeTable {
        &self.shared.table
    }

    pub fn speed_level(&self) -> SpeedLevel {
        self.speed_level
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Begin a session. A no-op while already collecting.
    ///
    /// The sampling thread is spawned before anything else, so a spawn
    /// failure leaves the previous session's results and the acquisition
    /// untouched. A failing `begin_acquisition` is logged and the session
    /// starts anyway.
    pub fn start(&self) -> Result<StartOutcome> {
        let mut lifecycle = lock(&self.lifecycle);
        if self.is_collecting() {
            log::debug!("start ignored: already collecting");
            return Ok(StartOutcome::AlreadyCollecting);
        }

        if let Schedule::Periodic(interval) = self.schedule {
            lifecycle.ticker = Some(Ticker::spawn(Arc::clone(&self.shared), interval)?);
        }

        if let Err(e) = lifecycle.acquisition.begin_acquisition() {
            log::warn!("begin_acquisition failed, collecting anyway: {e}");
        }

        let session_id = Uuid::new_v4().to_string();
        {
            let mut session = lock(&self.shared.session);
            session.aggregator.reset();
            session.window.clear();
            session.last_result = None;
            session.last_report = None;
            session.recorded = 0;
            session.skipped = 0;
            session.session_id = Some(session_id.clone());
            session.started_at_ms = now_ms();
            session.started = Instant::now();
            session.generation += 1;
            session.accepting = true;
            session.state = ControllerState::Collecting;
        }

        log::info!(
            "session {session_id} started (speed level {}, {})",
            self.speed_level,
            match self.schedule {
                Schedule::Periodic(iv) => format!("every {}ms", iv.as_millis()),
                Schedule::Manual => "manual ticks".to_string(),
            }
        );
        Ok(StartOutcome::Started { session_id })
    }

    /// Run one tick now. Returns [`TickOutcome::Inactive`] while idle or
    /// stopping.
    pub fn tick(&self) -> TickOutcome {
        self.shared.tick()
    }

    /// End the session and produce its report. Returns `None` while idle,
    /// leaving all state untouched.
    pub fn stop(&self) -> Option<SessionReport> {
        let mut lifecycle = lock(&self.lifecycle);
        {
            let mut session = lock(&self.shared.session);
            if session.state != ControllerState::Collecting {
                log::debug!("stop ignored: not collecting");
                return None;
            }
            session.accepting = false;
        }

        if let Some(ticker) = lifecycle.ticker.take() {
            ticker.cancel();
        }

        let prediction = match lifecycle.acquisition.end_acquisition() {
            Ok(p) => match p.validate() {
                Ok(()) => Some(p),
                Err(e) => {
                    log::warn!("discarding model prediction: {e}");
                    None
                }
            },
            Err(e) => {
                log::warn!("end_acquisition failed, verdict has no prediction: {e}");
                None
            }
        };

        let mut session = lock(&self.shared.session);
        let verdict = session.aggregator.finalize();
        let report = SessionReport {
            session_id: session.session_id.clone().unwrap_or_default(),
            speed_level: self.speed_level,
            source: self.source_name.clone(),
            started_at: format_iso8601(Duration::from_millis(session.started_at_ms)),
            ended_at: format_iso8601(Duration::from_millis(now_ms())),
            duration_ms: session.started.elapsed().as_millis() as u64,
            recorded: session.recorded,
            skipped: session.skipped,
            verdict,
            prediction,
            vibewatch_version: crate::VERSION.to_string(),
        };
        session.last_report = Some(report.clone());
        session.state = ControllerState::Idle;
        drop(session);

        log::info!(
            "session {} stopped: {} (risk index {:.2}, {} samples, {} skipped)",
            report.session_id,
            report.verdict.tier,
            report.verdict.risk_index,
            report.recorded,
            report.skipped
        );
        Some(report)
    }

    /// Verdict of the last stopped session.
    pub fn verdict(&self) -> Result<Verdict> {
        let session = lock(&self.shared.session);
        if session.state == ControllerState::Collecting {
            return Err(MonitorError::SessionActive);
        }
        session
            .last_report
            .as_ref()
            .map(|r| r.verdict.clone())
            .ok_or(MonitorError::NoVerdict)
    }

    pub fn last_report(&self) -> Option<SessionReport> {
        lock(&self.shared.session).last_report.clone()
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        let session = lock(&self.shared.session);
        MonitorSnapshot {
            state: session.state,
            session_id: session.session_id.clone(),
            speed_level: self.speed_level,
            window: session.window.snapshot(),
            last_classification: session.last_result,
            status: session.last_result.map(|r| LiveStatus {
                severity: r.severity,
                description: r.severity.description(self.speed_level),
                recommendation: r.severity.recommendation().to_string(),
            }),
            counts: session.aggregator.counts(),
            risk_index: session.aggregator.risk_index(),
            recorded: session.recorded,
            skipped: session.skipped,
            last_report: session.last_report.clone(),
        }
    }
}

impl Drop for CollectionController {
    fn drop(&mut self) {
        if let Some(ticker) = lock(&self.lifecycle).ticker.take() {
            ticker.cancel();
        }
    }
}

/// Lock, recovering the guard if a previous holder panicked.
fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
