//! Phase scheduler
//!
//! Re-evaluates the phase clock on a fixed period and hands every changed
//! [`Evaluation`] to an observer. The scheduler owns its tick task; `start`
//! and `stop` are the only operations that change its state.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::PhaseError;
use crate::observability::metrics;

use super::clock::{Evaluation, evaluate};
use super::target::PhaseTargets;

/// Default tick period.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

/// Shortest accepted tick period.
pub const MIN_PERIOD: Duration = Duration::from_millis(10);

/// Parses a tick period such as `500ms` or `2s`.
///
/// # Errors
///
/// Returns [`PhaseError::InvalidDuration`] if `text` is not a duration or
/// is shorter than [`MIN_PERIOD`].
pub fn parse_period(text: &str) -> Result<Duration, PhaseError> {
    let period = humantime::parse_duration(text.trim()).map_err(|e| PhaseError::InvalidDuration {
        value: text.to_string(),
        message: e.to_string(),
    })?;
    if period < MIN_PERIOD {
        return Err(PhaseError::InvalidDuration {
            value: text.to_string(),
            message: format!("must be at least {}", humantime::format_duration(MIN_PERIOD)),
        });
    }
    Ok(period)
}

// ============================================================================
// Clock sources
// ============================================================================

/// Source of "now" for the scheduler.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A wall-clock instant advanced by Tokio's monotonic clock.
///
/// Reads `start` at creation and moves forward with `tokio::time::Instant`,
/// so it follows paused and advanced Tokio time exactly. Used to preview an
/// experience from a chosen moment and to drive the scheduler in tests.
#[derive(Debug, Clone)]
pub struct AnchoredClock {
    start: DateTime<Utc>,
    origin: Instant,
}

impl AnchoredClock {
    /// Creates a clock that reads `start` now.
    #[must_use]
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            origin: Instant::now(),
        }
    }
}

impl Clock for AnchoredClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.origin.elapsed()).unwrap_or(TimeDelta::MAX);
        self.start
            .checked_add_signed(elapsed)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Callback receiving each changed evaluation.
pub type Observer = Box<dyn FnMut(&Evaluation) + Send>;

/// Lifecycle of a [`PhaseScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No tick task exists.
    Idle,
    /// A tick task is publishing evaluations.
    Running,
}

/// Live tick task of a running scheduler.
struct TickTask {
    /// Cleared by `stop`; the task publishes only while it holds `Some`.
    observer: Arc<Mutex<Option<Observer>>>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Periodically evaluates a target set and publishes changes.
///
/// `Idle -(start)-> Running -(stop)-> Idle`. Starting a running scheduler
/// is a no-op; stopping is synchronous, so once [`stop`](Self::stop)
/// returns the observer is never called again. Dropping a running
/// scheduler stops it.
pub struct PhaseScheduler {
    targets: Arc<PhaseTargets>,
    clock: Arc<dyn Clock>,
    period: Duration,
    task: Option<TickTask>,
}

impl PhaseScheduler {
    /// Creates an idle scheduler with the default one-second period.
    #[must_use]
    pub fn new(targets: Arc<PhaseTargets>, clock: Arc<dyn Clock>) -> Self {
        Self {
            targets,
            clock,
            period: DEFAULT_PERIOD,
            task: None,
        }
    }

    /// Sets the tick period. Periods shorter than [`MIN_PERIOD`] are raised
    /// to it.
    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period.max(MIN_PERIOD);
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        if self.task.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    /// The target set being evaluated.
    #[must_use]
    pub fn targets(&self) -> &PhaseTargets {
        &self.targets
    }

    /// Starts publishing to `observer`.
    ///
    /// The first evaluation is published before this returns; later ones
    /// follow once per period, and only when phase or breakdown changed.
    /// Returns `false` and drops `observer` if the scheduler is already
    /// running.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start<F>(&mut self, observer: F) -> bool
    where
        F: FnMut(&Evaluation) + Send + 'static,
    {
        if self.task.is_some() {
            warn!("phase scheduler already running; start ignored");
            return false;
        }

        let mut observer: Observer = Box::new(observer);
        let first = evaluate(self.clock.now(), &self.targets);
        self.log_phase(&first);
        observer(&first);
        metrics::record_publication(&first);

        let observer = Arc::new(Mutex::new(Some(observer)));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(tick_loop(
            Arc::clone(&self.targets),
            Arc::clone(&self.clock),
            Instant::now() + self.period,
            self.period,
            Arc::clone(&observer),
            cancel.clone(),
            first,
        ));

        info!(
            period_ms = u64::try_from(self.period.as_millis()).unwrap_or(u64::MAX),
            phases = self.targets.phase_count(),
            "phase scheduler started"
        );

        self.task = Some(TickTask {
            observer,
            cancel,
            handle,
        });
        true
    }

    /// Stops publishing. No-op when idle.
    ///
    /// Waits for an in-flight observer call to finish, so the observer must
    /// not call `stop` on its own scheduler.
    pub fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        task.observer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        task.cancel.cancel();
        task.handle.abort();
        info!("phase scheduler stopped");
    }

    fn log_phase(&self, evaluation: &Evaluation) {
        let index = evaluation.phase.index();
        info!(
            phase = self.targets.label(index).unwrap_or("?"),
            index,
            remaining = %evaluation.breakdown,
            "phase evaluated"
        );
    }
}

impl Drop for PhaseScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PhaseScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseScheduler")
            .field("state", &self.state())
            .field("period", &self.period)
            .field("phases", &self.targets.phase_count())
            .finish_non_exhaustive()
    }
}

/// Body of the tick task.
async fn tick_loop(
    targets: Arc<PhaseTargets>,
    clock: Arc<dyn Clock>,
    first_tick: Instant,
    period: Duration,
    observer: Arc<Mutex<Option<Observer>>>,
    cancel: CancellationToken,
    first: Evaluation,
) {
    let mut interval = tokio::time::interval_at(first_tick, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = first;

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                debug!("tick task cancelled");
                break;
            }
            _ = interval.tick() => {
                let evaluation = evaluate(clock.now(), &targets);
                if evaluation == last {
                    continue;
                }

                if evaluation.phase != last.phase {
                    let from = targets.label(last.phase.index()).unwrap_or("?");
                    let to = targets.label(evaluation.phase.index()).unwrap_or("?");
                    info!(from, to, "phase transition");
                    metrics::record_phase_transition(from, to);
                }

                if !publish(&observer, &evaluation) {
                    debug!("observer detached; tick task exiting");
                    break;
                }
                metrics::record_publication(&evaluation);
                last = evaluation;
            }
        }
    }
}

/// Hands `evaluation` to the observer. Returns `false` once it was removed.
fn publish(observer: &Mutex<Option<Observer>>, evaluation: &Evaluation) -> bool {
    let Ok(mut guard) = observer.lock() else {
        return false;
    };
    guard.as_mut().is_some_and(|observer| {
        observer(evaluation);
        true
    })
}
