//! Phase clock
//!
//! Pure evaluation of "where are we" against a target set: the current
//! phase plus the countdown to the next unreached target. The same inputs
//! always produce the same [`Evaluation`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::target::PhaseTargets;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;
const MILLIS_PER_DAY: u64 = 86_400_000;

/// Index of a phase within a target set.
///
/// `Phase(0)` is the initial phase; `Phase(k)` is the phase after the
/// k-th target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Phase(usize);

impl Phase {
    /// The phase before any target is reached.
    pub const INITIAL: Self = Self(0);

    /// Creates a phase from its index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Zero-based index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Whether no target has been reached yet.
    #[must_use]
    pub const fn is_initial(self) -> bool {
        self.0 == 0
    }
}

/// Remaining time split into calendar-style units.
///
/// `hours`, `minutes` and `seconds` are remainders, not running totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Breakdown {
    /// Whole days.
    pub days: u64,
    /// Hours past the whole days (0-23).
    pub hours: u64,
    /// Minutes past the whole hours (0-59).
    pub minutes: u64,
    /// Seconds past the whole minutes (0-59).
    pub seconds: u64,
}

impl Breakdown {
    /// All units zero.
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Splits a number of seconds into days, hours, minutes and seconds.
    #[must_use]
    pub const fn from_seconds(total: u64) -> Self {
        Self {
            days: total / SECONDS_PER_DAY,
            hours: (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR,
            minutes: (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
            seconds: total % SECONDS_PER_MINUTE,
        }
    }

    /// Time from `now` until `target`, floored to whole seconds and
    /// clamped to zero once `target` has passed.
    #[must_use]
    pub fn until(now: DateTime<Utc>, target: DateTime<Utc>) -> Self {
        let remaining = (target - now).num_seconds();
        Self::from_seconds(u64::try_from(remaining).unwrap_or(0))
    }

    /// Sum of all units, in seconds.
    #[must_use]
    pub const fn total_seconds(&self) -> u64 {
        self.days * SECONDS_PER_DAY
            + self.hours * SECONDS_PER_HOUR
            + self.minutes * SECONDS_PER_MINUTE
            + self.seconds
    }

    /// Whether no time remains.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }
}

impl std::fmt::Display for Breakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Result of evaluating the clock at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// Current phase.
    pub phase: Phase,
    /// Countdown to the next unreached target.
    pub breakdown: Breakdown,
}

/// Evaluates `targets` at `now`.
///
/// The phase is the one entered at the last target whose instant is
/// `<= now` (the initial phase if there is none). The breakdown counts
/// down to the first target with instant `> now`, and is zero once every
/// target has been reached.
#[must_use]
pub fn evaluate(now: DateTime<Utc>, targets: &PhaseTargets) -> Evaluation {
    // targets are strictly increasing, so the reached ones form a prefix
    let reached = targets
        .targets()
        .iter()
        .take_while(|target| target.at <= now)
        .count();

    let breakdown = targets
        .targets()
        .get(reached)
        .map_or(Breakdown::ZERO, |next| Breakdown::until(now, next.at));

    Evaluation {
        phase: Phase(reached),
        breakdown,
    }
}

/// Whole days left until `date`, rounding any partial day up.
///
/// Zero once `date` has passed.
#[must_use]
pub fn days_until(now: DateTime<Utc>, date: DateTime<Utc>) -> u64 {
    let millis = (date - now).num_milliseconds();
    u64::try_from(millis).map_or(0, |millis| millis.div_ceil(MILLIS_PER_DAY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::target::PhaseTarget;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn two_targets() -> PhaseTargets {
        PhaseTargets::new(
            "COUNTDOWN",
            vec![
                PhaseTarget::new("celebration_start", "CELEBRATION", at(100)),
                PhaseTarget::new("focus_start", "FOCUS", at(200)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn before_first_target_is_initial() {
        let eval = evaluate(at(99), &two_targets());
        assert_eq!(eval.phase, Phase::INITIAL);
        assert_eq!(eval.breakdown, Breakdown::from_seconds(1));
    }

    #[test]
    fn reaching_a_target_enters_its_phase() {
        let targets = two_targets();
        let eval = evaluate(at(100), &targets);
        assert_eq!(eval.phase, Phase::new(1));
        assert_eq!(targets.label(eval.phase.index()), Some("CELEBRATION"));
        assert_eq!(eval.breakdown.total_seconds(), 100);
    }

    #[test]
    fn counts_down_to_next_unreached_target() {
        let eval = evaluate(at(199), &two_targets());
        assert_eq!(eval.phase, Phase::new(1));
        assert_eq!(eval.breakdown, Breakdown::from_seconds(1));
    }

    #[test]
    fn last_target_is_terminal_with_zero_breakdown() {
        for now in [200, 300, 1_000_000] {
            let eval = evaluate(at(now), &two_targets());
            assert_eq!(eval.phase, Phase::new(2));
            assert!(eval.breakdown.is_zero());
        }
    }

    #[test]
    fn sub_second_remainder_is_floored() {
        let now = at(98) + chrono::Duration::milliseconds(250);
        let eval = evaluate(now, &two_targets());
        assert_eq!(eval.breakdown.seconds, 1);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let targets = two_targets();
        assert_eq!(evaluate(at(150), &targets), evaluate(at(150), &targets));
    }

    #[test]
    fn no_targets_means_initial_forever() {
        let targets = PhaseTargets::new("WAITING", vec![]).unwrap();
        let eval = evaluate(at(5), &targets);
        assert_eq!(eval.phase, Phase::INITIAL);
        assert!(eval.breakdown.is_zero());
    }

    #[test]
    fn decomposes_one_of_each_unit() {
        let b = Breakdown::from_seconds(90_061);
        assert_eq!(
            b,
            Breakdown {
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1
            }
        );
        assert_eq!(b.total_seconds(), 90_061);
    }

    #[test]
    fn units_are_remainders_not_totals() {
        let b = Breakdown::from_seconds(2 * 86_400 + 23 * 3600 + 59 * 60 + 59);
        assert_eq!((b.days, b.hours, b.minutes, b.seconds), (2, 23, 59, 59));
    }

    #[test]
    fn displays_zero_padded() {
        assert_eq!(Breakdown::from_seconds(90_061).to_string(), "01:01:01:01");
        assert_eq!(Breakdown::ZERO.to_string(), "00:00:00:00");
        assert_eq!(Breakdown::from_seconds(120 * 86_400).to_string(), "120:00:00:00");
    }

    #[test]
    fn until_clamps_past_targets() {
        assert_eq!(Breakdown::until(at(10), at(5)), Breakdown::ZERO);
    }

    #[test]
    fn days_until_rounds_up() {
        let now = at(0);
        assert_eq!(days_until(now, at(1)), 1);
        assert_eq!(days_until(now, at(86_400)), 1);
        assert_eq!(days_until(now, at(86_401)), 2);
    }

    #[test]
    fn days_until_clamps_at_zero() {
        assert_eq!(days_until(at(100), at(100)), 0);
        assert_eq!(days_until(at(100), at(50)), 0);
    }
}
