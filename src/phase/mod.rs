//! Phase engine
//!
//! Drives the countdown-style experiences: a fixed, ordered set of target
//! instants splits time into phases, and a scheduler re-evaluates where
//! "now" falls once per second.
//!
//! # Architecture
//!
//! - [`PhaseTargets`]: validated, strictly increasing phase boundaries
//! - [`evaluate`]: pure clock, `(now, targets) -> (phase, breakdown)`
//! - [`PhaseScheduler`]: owns the tick task and publishes changes
//! - [`preset`]: built-in target sets (New Year)

pub mod clock;
pub mod preset;
pub mod scheduler;
pub mod target;

pub use clock::{Breakdown, Evaluation, Phase, days_until, evaluate};
pub use preset::{NewYearPhase, coming_new_year, new_year_targets};
pub use scheduler::{
    AnchoredClock, Clock, PhaseScheduler, SchedulerState, SystemClock, parse_period,
};
pub use target::{PhaseTarget, PhaseTargets, parse_instant};
