//! Built-in target sets.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use serde::Serialize;

use crate::error::PhaseError;

use super::clock::Phase;
use super::target::{PhaseTarget, PhaseTargets, local_to_utc};

/// Phases of the New Year experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NewYearPhase {
    /// Counting down to midnight.
    Countdown,
    /// New Year's Day.
    Celebration,
    /// From January 2nd on.
    Focus,
}

impl NewYearPhase {
    /// Label used in target sets and output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Countdown => "COUNTDOWN",
            Self::Celebration => "CELEBRATION",
            Self::Focus => "FOCUS",
        }
    }

    /// Maps an evaluated phase of [`new_year_targets`] onto the enum.
    ///
    /// Indices past the last phase saturate to [`NewYearPhase::Focus`].
    #[must_use]
    pub const fn from_phase(phase: Phase) -> Self {
        match phase.index() {
            0 => Self::Countdown,
            1 => Self::Celebration,
            _ => Self::Focus,
        }
    }
}

impl std::fmt::Display for NewYearPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Targets for the New Year of `year` in `tz`: CELEBRATION at midnight on
/// January 1st, FOCUS at midnight on January 2nd.
///
/// # Errors
///
/// Returns [`PhaseError::InvalidInstant`] for a year chrono cannot
/// represent, or [`PhaseError::AmbiguousLocalTime`] if midnight is not a
/// single instant in `tz`.
pub fn new_year_targets<Tz: TimeZone>(tz: &Tz, year: i32) -> Result<PhaseTargets, PhaseError> {
    let midnight = |day: u32| {
        NaiveDate::from_ymd_opt(year, 1, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| PhaseError::InvalidInstant(format!("{year}-01-{day:02}")))
            .and_then(|naive| local_to_utc(tz, naive))
    };

    PhaseTargets::new(
        NewYearPhase::Countdown.label(),
        vec![
            PhaseTarget::new(
                "new_year",
                NewYearPhase::Celebration.label(),
                midnight(1)?,
            ),
            PhaseTarget::new("focus_start", NewYearPhase::Focus.label(), midnight(2)?),
        ],
    )
}

/// Year whose New Year experience is current at `now`: this year on
/// January 1st, the next year on every other day.
#[must_use]
pub fn coming_new_year<Tz: TimeZone>(now: &DateTime<Tz>) -> i32 {
    if now.month() == 1 && now.day() == 1 {
        now.year()
    } else {
        now.year() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::clock::{Breakdown, evaluate};
    use chrono::{FixedOffset, Utc};

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
    }

    #[test]
    fn labels_match_targets() {
        let targets = new_year_targets(&Utc, 2026).unwrap();
        for (i, phase) in [
            NewYearPhase::Countdown,
            NewYearPhase::Celebration,
            NewYearPhase::Focus,
        ]
        .into_iter()
        .enumerate()
        {
            assert_eq!(targets.label(i), Some(phase.label()));
            assert_eq!(NewYearPhase::from_phase(Phase::new(i)), phase);
        }
    }

    #[test]
    fn last_second_of_the_year() {
        let targets = new_year_targets(&ist(), 2026).unwrap();
        let now = ist().with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        let eval = evaluate(now.with_timezone(&Utc), &targets);
        assert_eq!(NewYearPhase::from_phase(eval.phase), NewYearPhase::Countdown);
        assert_eq!(eval.breakdown, Breakdown::from_seconds(1));
    }

    #[test]
    fn midnight_starts_celebration() {
        let targets = new_year_targets(&ist(), 2026).unwrap();
        let now = ist().with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let eval = evaluate(now.with_timezone(&Utc), &targets);
        assert_eq!(NewYearPhase::from_phase(eval.phase), NewYearPhase::Celebration);
        assert_eq!(eval.breakdown, Breakdown::from_seconds(86_400));
    }

    #[test]
    fn second_of_january_is_focus() {
        let targets = new_year_targets(&ist(), 2026).unwrap();
        let now = ist().with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        let eval = evaluate(now.with_timezone(&Utc), &targets);
        assert_eq!(NewYearPhase::from_phase(eval.phase), NewYearPhase::Focus);
        assert!(eval.breakdown.is_zero());
    }

    #[test]
    fn coming_new_year_switches_after_new_years_day() {
        let at = |m, d| ist().with_ymd_and_hms(2026, m, d, 12, 0, 0).unwrap();
        assert_eq!(coming_new_year(&at(1, 1)), 2026);
        assert_eq!(coming_new_year(&at(1, 2)), 2027);
        assert_eq!(coming_new_year(&at(12, 31)), 2027);
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(NewYearPhase::Celebration.to_string(), "CELEBRATION");
    }
}
