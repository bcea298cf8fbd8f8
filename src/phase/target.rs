//! Phase targets
//!
//! The ordered set of instants that mark phase boundaries. A target set is
//! validated once, at construction, and is immutable afterwards.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use crate::error::PhaseError;

/// A single phase boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseTarget {
    /// Boundary name, e.g. `celebration_start`.
    pub name: String,
    /// Label of the phase entered at this instant, e.g. `CELEBRATION`.
    pub phase: String,
    /// When the boundary is crossed.
    pub at: DateTime<Utc>,
}

impl PhaseTarget {
    /// Creates a target.
    #[must_use]
    pub fn new(name: impl Into<String>, phase: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            phase: phase.into(),
            at,
        }
    }
}

/// The initial phase label plus strictly increasing targets.
///
/// Phase `0` is the initial phase; phase `k` is the phase entered at
/// target `k - 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseTargets {
    initial: String,
    targets: Vec<PhaseTarget>,
}

impl PhaseTargets {
    /// Builds a validated target set.
    ///
    /// An empty target list is allowed; the initial phase then lasts
    /// forever with a zero countdown.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::EmptyLabel`] if the initial label or any
    /// target's phase label is empty, and [`PhaseError::UnorderedTargets`]
    /// if the instants are not strictly increasing.
    pub fn new(initial: impl Into<String>, targets: Vec<PhaseTarget>) -> Result<Self, PhaseError> {
        let initial = initial.into();
        if initial.trim().is_empty() {
            return Err(PhaseError::EmptyLabel("initial phase".to_string()));
        }

        for (i, target) in targets.iter().enumerate() {
            if target.phase.trim().is_empty() {
                return Err(PhaseError::EmptyLabel(format!("targets[{i}].phase")));
            }
        }

        for pair in targets.windows(2) {
            if pair[1].at <= pair[0].at {
                return Err(PhaseError::UnorderedTargets {
                    name: pair[1].name.clone(),
                    at: pair[1].at.to_rfc3339(),
                    previous: pair[0].at.to_rfc3339(),
                });
            }
        }

        Ok(Self { initial, targets })
    }

    /// Label of the phase before any target is reached.
    #[must_use]
    pub fn initial(&self) -> &str {
        &self.initial
    }

    /// The targets in time order.
    #[must_use]
    pub fn targets(&self) -> &[PhaseTarget] {
        &self.targets
    }

    /// Number of distinct phases (targets + 1).
    #[must_use]
    pub fn phase_count(&self) -> usize {
        self.targets.len() + 1
    }

    /// Label for the phase at `index`, or `None` if out of range.
    #[must_use]
    pub fn label(&self, index: usize) -> Option<&str> {
        match index {
            0 => Some(&self.initial),
            k => self.targets.get(k - 1).map(|t| t.phase.as_str()),
        }
    }

    /// The instant the last phase begins, if there are targets.
    #[must_use]
    pub fn final_instant(&self) -> Option<DateTime<Utc>> {
        self.targets.last().map(|t| t.at)
    }
}

/// Parses an instant the way the greeting pages accept them.
///
/// Accepts RFC 3339 (`2026-01-01T00:00:00+05:30`, `...Z`), a naive
/// date-time (`2026-01-01T00:00:00`) or a bare date (`2026-01-01`). Naive
/// forms are read in the local time zone.
///
/// # Errors
///
/// Returns [`PhaseError::InvalidInstant`] for unrecognized text and
/// [`PhaseError::AmbiguousLocalTime`] when a naive time falls in a DST gap
/// or overlap.
pub fn parse_instant(text: &str) -> Result<DateTime<Utc>, PhaseError> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d").map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|_| PhaseError::InvalidInstant(text.to_string()))?;

    local_to_utc(&Local, naive)
}

/// Resolves a naive wall-clock time in `tz` to UTC.
///
/// # Errors
///
/// Returns [`PhaseError::AmbiguousLocalTime`] if the time does not map to
/// exactly one instant.
pub fn local_to_utc<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Result<DateTime<Utc>, PhaseError> {
    tz.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| PhaseError::AmbiguousLocalTime(naive.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn accepts_increasing_targets() {
        let targets = PhaseTargets::new(
            "COUNTDOWN",
            vec![
                PhaseTarget::new("celebration_start", "CELEBRATION", at(100)),
                PhaseTarget::new("focus_start", "FOCUS", at(200)),
            ],
        )
        .unwrap();
        assert_eq!(targets.phase_count(), 3);
        assert_eq!(targets.label(0), Some("COUNTDOWN"));
        assert_eq!(targets.label(2), Some("FOCUS"));
        assert_eq!(targets.label(3), None);
        assert_eq!(targets.final_instant(), Some(at(200)));
    }

    #[test]
    fn rejects_equal_instants() {
        let err = PhaseTargets::new(
            "COUNTDOWN",
            vec![
                PhaseTarget::new("a", "A", at(100)),
                PhaseTarget::new("b", "B", at(100)),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, PhaseError::UnorderedTargets { ref name, .. } if name == "b"));
    }

    #[test]
    fn rejects_decreasing_instants() {
        let err = PhaseTargets::new(
            "COUNTDOWN",
            vec![
                PhaseTarget::new("a", "A", at(200)),
                PhaseTarget::new("b", "B", at(100)),
            ],
        );
        assert!(err.is_err());
    }

    #[test]
    fn rejects_empty_labels() {
        assert!(matches!(
            PhaseTargets::new(" ", vec![]),
            Err(PhaseError::EmptyLabel(_))
        ));
        assert!(matches!(
            PhaseTargets::new("X", vec![PhaseTarget::new("a", "", at(1))]),
            Err(PhaseError::EmptyLabel(_))
        ));
    }

    #[test]
    fn empty_target_list_is_allowed() {
        let targets = PhaseTargets::new("WAITING", vec![]).unwrap();
        assert_eq!(targets.phase_count(), 1);
        assert_eq!(targets.final_instant(), None);
    }

    #[test]
    fn parses_rfc3339() {
        assert_eq!(
            parse_instant("2026-01-01T00:00:00+05:30").unwrap(),
            Utc.with_ymd_and_hms(2025, 12, 31, 18, 30, 0).unwrap()
        );
        assert_eq!(
            parse_instant("2026-02-14T10:30:00.000Z").unwrap(),
            Utc.with_ymd_and_hms(2026, 2, 14, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn parses_naive_forms_in_local_time() {
        let expected = Local
            .with_ymd_and_hms(2026, 6, 15, 9, 0, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parse_instant("2026-06-15T09:00:00").unwrap(), expected);

        let midnight = Local
            .with_ymd_and_hms(2026, 6, 15, 0, 0, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parse_instant("2026-06-15").unwrap(), midnight);
    }

    #[test]
    fn rejects_unparseable_instant() {
        assert!(matches!(
            parse_instant("next tuesday"),
            Err(PhaseError::InvalidInstant(_))
        ));
    }

    #[test]
    fn local_to_utc_with_fixed_offset() {
        let ist = chrono::FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let naive = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            local_to_utc(&ist, naive).unwrap(),
            Utc.with_ymd_and_hms(2025, 12, 31, 18, 30, 0).unwrap()
        );
    }
}
