//! Structured event stream.
//!
//! Typed events emitted while the countdown runs, serialized as
//! newline-delimited JSON with a monotonically increasing sequence number.

use std::io::{BufWriter, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::phase::Breakdown;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event, tagged with `"type"` when serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The scheduler started publishing.
    SchedulerStarted {
        /// Wall-clock time of the event.
        timestamp: DateTime<Utc>,
        /// Experience name from configuration.
        experience: String,
        /// Number of phases, initial included.
        phases: usize,
        /// Tick period in milliseconds.
        period_ms: u64,
    },

    /// A phase was entered.
    PhaseEntered {
        /// Wall-clock time of the event.
        timestamp: DateTime<Utc>,
        /// Phase label.
        phase_name: String,
        /// Zero-based phase index.
        phase_index: usize,
    },

    /// A published countdown value.
    Countdown {
        /// Clock time the evaluation was made for.
        timestamp: DateTime<Utc>,
        /// Phase label.
        phase_name: String,
        /// Zero-based phase index.
        phase_index: usize,
        /// Time left until the next boundary.
        remaining: Breakdown,
    },

    /// The scheduler stopped.
    SchedulerStopped {
        /// Wall-clock time of the event.
        timestamp: DateTime<Utc>,
        /// Why it stopped.
        reason: StopReason,
        /// Number of evaluations published.
        publications: u64,
    },
}

/// Why a countdown run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The final phase was reached.
    FinalPhase,
    /// Interrupted by a signal.
    Interrupted,
    /// The publication channel closed.
    Closed,
}

/// Wraps an [`Event`] with its sequence number.
#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization and I/O failures are dropped; the countdown keeps running
/// even if its output sink goes away.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to `writer`.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Emits `event` as a single JSON line and flushes.
    pub fn emit(&self, event: Event) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope { sequence, event };

        if let Ok(mut w) = self.writer.lock()
            && let Ok(line) = serde_json::to_string(&envelope)
        {
            let _ = writeln!(w, "{line}");
            let _ = w.flush();
        }
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}
