//! Experience file schema.
//!
//! Types deserialized from YAML experience files. An experience names a
//! set of phase boundaries, the tick period of its countdown, and where
//! its share links point.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PhaseError;
use crate::phase::scheduler::{DEFAULT_PERIOD, parse_period};
use crate::phase::{PhaseTarget, PhaseTargets, parse_instant};

// ============================================================================
// Top-Level Configuration
// ============================================================================

/// Root of an experience file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExperienceConfig {
    /// Experience metadata (required)
    pub experience: ExperienceMetadata,

    /// Phase boundaries and tick period (required)
    pub schedule: ScheduleConfig,

    /// Share link settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share: Option<ShareConfig>,

    /// Fallback values shown when a link carries no usable token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

/// Experience identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceMetadata {
    /// Experience name (required)
    pub name: String,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ============================================================================
// Schedule
// ============================================================================

/// Phase schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Label of the phase before the first target.
    pub initial_phase: String,

    /// Tick period as a human-readable duration (`"1s"`, `"500ms"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick: Option<String>,

    /// Phase boundaries, strictly increasing in time.
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// One phase boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Boundary name; defaults to `<phase>_start` in lower case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Label of the phase entered at this boundary.
    pub phase: String,

    /// Instant of the boundary. RFC 3339, or a naive date/time read in
    /// local time.
    pub at: String,
}

impl TargetConfig {
    /// Boundary name, falling back to `<phase>_start`.
    #[must_use]
    pub fn resolved_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}_start", self.phase.to_lowercase()))
    }
}

// ============================================================================
// Share / Defaults
// ============================================================================

/// Where share links point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Scheme and host, e.g. `https://example.com`.
    pub origin: String,

    /// Page path, e.g. `/new-year`.
    #[serde(default = "default_share_path")]
    pub path: String,

    /// Message prefixed to the link in chat shares.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn default_share_path() -> String {
    "/".to_string()
}

/// Placeholder values for pages opened without a token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Greeting recipient name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// First partner on couple cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_a: Option<String>,

    /// Second partner on couple cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_b: Option<String>,
}

// ============================================================================
// Conversions
// ============================================================================

impl ExperienceConfig {
    /// Builds the validated target set.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError`] if an instant does not parse, a label is
    /// empty, or the targets are not strictly increasing.
    pub fn to_targets(&self) -> Result<PhaseTargets, PhaseError> {
        let targets = self
            .schedule
            .targets
            .iter()
            .map(|t| {
                parse_instant(&t.at).map(|at| PhaseTarget::new(t.resolved_name(), &t.phase, at))
            })
            .collect::<Result<Vec<_>, _>>()?;
        PhaseTargets::new(&self.schedule.initial_phase, targets)
    }

    /// Tick period, [`DEFAULT_PERIOD`] when unset.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::InvalidDuration`] if `schedule.tick` is not a
    /// valid duration or is shorter than
    /// [`MIN_PERIOD`](crate::phase::scheduler::MIN_PERIOD).
    pub fn tick_period(&self) -> Result<Duration, PhaseError> {
        self.schedule
            .tick
            .as_deref()
            .map_or(Ok(DEFAULT_PERIOD), parse_period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExperienceConfig {
        serde_yaml::from_str(
            r#"
experience:
  name: New Year
schedule:
  initial_phase: COUNTDOWN
  tick: 500ms
  targets:
    - name: new_year
      phase: CELEBRATION
      at: "2026-01-01T00:00:00+05:30"
    - phase: FOCUS
      at: "2026-01-02T00:00:00+05:30"
share:
  origin: https://example.com
"#,
        )
        .unwrap()
    }

    #[test]
    fn deserializes_minimal_fields() {
        let config = sample();
        assert_eq!(config.experience.name, "New Year");
        assert_eq!(config.schedule.targets.len(), 2);
        assert_eq!(config.share.unwrap().path, "/");
        assert!(config.defaults.is_none());
    }

    #[test]
    fn target_name_defaults_from_phase() {
        let config = sample();
        assert_eq!(config.schedule.targets[1].resolved_name(), "focus_start");
    }

    #[test]
    fn builds_targets() {
        let targets = sample().to_targets().unwrap();
        assert_eq!(targets.phase_count(), 3);
        assert_eq!(targets.label(1), Some("CELEBRATION"));
        assert_eq!(
            targets.targets()[0].at.to_rfc3339(),
            "2025-12-31T18:30:00+00:00"
        );
    }

    #[test]
    fn tick_period_parses_humantime() {
        assert_eq!(sample().tick_period().unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn tick_period_defaults_to_one_second() {
        let mut config = sample();
        config.schedule.tick = None;
        assert_eq!(config.tick_period().unwrap(), DEFAULT_PERIOD);
    }

    #[test]
    fn tick_period_rejects_garbage_and_tiny_values() {
        let mut config = sample();
        config.schedule.tick = Some("soon".into());
        assert!(matches!(
            config.tick_period(),
            Err(PhaseError::InvalidDuration { .. })
        ));
        config.schedule.tick = Some("1ms".into());
        assert!(config.tick_period().is_err());
    }
}
