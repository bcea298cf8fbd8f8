//! Experience file validation.
//!
//! Runs on the deserialized [`ExperienceConfig`] and collects every issue
//! rather than stopping at the first one.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::loader::ConfigLimits;
use crate::config::schema::{ExperienceConfig, ScheduleConfig};
use crate::error::{Severity, ValidationIssue};
use crate::link::FIELD_DELIMITER;
use crate::phase::parse_instant;
use crate::phase::scheduler::MIN_PERIOD;

/// Longest tick period accepted without a warning.
const MAX_QUIET_PERIOD: Duration = Duration::from_secs(60);

/// Result of validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Experience file validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `config` and returns every issue found.
    pub fn validate(&mut self, config: &ExperienceConfig, limits: &ConfigLimits) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        if config.experience.name.trim().is_empty() {
            self.add_error("experience.name", "Experience name is required and cannot be empty");
        }

        self.validate_schedule(&config.schedule, limits);
        self.validate_share(config);
        self.validate_defaults(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Schedule
    // ========================================================================

    fn validate_schedule(&mut self, schedule: &ScheduleConfig, limits: &ConfigLimits) {
        if schedule.initial_phase.trim().is_empty() {
            self.add_error("schedule.initial_phase", "Initial phase label cannot be empty");
        }

        if let Some(tick) = &schedule.tick {
            self.validate_tick(tick);
        }

        if schedule.targets.is_empty() {
            self.add_warning(
                "schedule.targets",
                "No targets defined; the experience stays in its initial phase",
            );
        }

        if schedule.targets.len() > limits.max_targets {
            self.add_error(
                "schedule.targets",
                &format!(
                    "Too many targets: {} (maximum: {}). \
                     Set KEEPSAKE_MAX_TARGETS to increase the limit.",
                    schedule.targets.len(),
                    limits.max_targets
                ),
            );
        }

        let mut names = HashSet::new();
        let mut previous: Option<DateTime<Utc>> = None;
        for (i, target) in schedule.targets.iter().enumerate() {
            let path = format!("schedule.targets[{i}]");

            if target.phase.trim().is_empty() {
                self.add_error(&format!("{path}.phase"), "Phase label cannot be empty");
            }

            let name = target.resolved_name();
            if !names.insert(name.clone()) {
                self.add_error(
                    &format!("{path}.name"),
                    &format!("Duplicate target name '{name}'"),
                );
            }

            match parse_instant(&target.at) {
                Ok(at) => {
                    if let Some(prev) = previous
                        && at <= prev
                    {
                        self.add_error(
                            &format!("{path}.at"),
                            &format!(
                                "Target '{name}' at {at} is not after the previous target at {prev}"
                            ),
                        );
                    }
                    previous = Some(at);
                }
                Err(e) => self.add_error(&format!("{path}.at"), &e.to_string()),
            }
        }
    }

    fn validate_tick(&mut self, tick: &str) {
        match humantime::parse_duration(tick.trim()) {
            Ok(period) if period < MIN_PERIOD => self.add_error(
                "schedule.tick",
                &format!(
                    "Tick '{tick}' is shorter than the minimum of {}",
                    humantime::format_duration(MIN_PERIOD)
                ),
            ),
            Ok(period) if period > MAX_QUIET_PERIOD => self.add_warning(
                "schedule.tick",
                &format!("Tick '{tick}' is long; the countdown will visibly lag"),
            ),
            Ok(_) => {}
            Err(e) => self.add_error(
                "schedule.tick",
                &format!("Invalid duration '{tick}': {e}"),
            ),
        }
    }

    // ========================================================================
    // Share / Defaults
    // ========================================================================

    fn validate_share(&mut self, config: &ExperienceConfig) {
        let Some(share) = &config.share else {
            return;
        };

        if share.origin.trim().is_empty() {
            self.add_error("share.origin", "Share origin cannot be empty");
        } else if !(share.origin.starts_with("https://") || share.origin.starts_with("http://")) {
            self.add_warning(
                "share.origin",
                &format!("Origin '{}' is not an http(s) URL", share.origin),
            );
        }

        if share.origin.contains('?') || share.origin.contains('#') {
            self.add_error("share.origin", "Origin must not contain a query or fragment");
        }
    }

    fn validate_defaults(&mut self, config: &ExperienceConfig) {
        let Some(defaults) = &config.defaults else {
            return;
        };

        for (field, value) in [
            ("defaults.partner_a", &defaults.partner_a),
            ("defaults.partner_b", &defaults.partner_b),
        ] {
            if let Some(value) = value
                && value.contains(FIELD_DELIMITER)
            {
                self.add_error(
                    field,
                    &format!("Partner names cannot contain '{FIELD_DELIMITER}'"),
                );
            }
        }
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{
        DefaultsConfig, ExperienceMetadata, ShareConfig, TargetConfig,
    };

    fn limits() -> ConfigLimits {
        ConfigLimits {
            max_targets: 4,
            max_config_size: 1024,
        }
    }

    fn target(phase: &str, at: &str) -> TargetConfig {
        TargetConfig {
            name: None,
            phase: phase.to_string(),
            at: at.to_string(),
        }
    }

    fn config(targets: Vec<TargetConfig>) -> ExperienceConfig {
        ExperienceConfig {
            experience: ExperienceMetadata {
                name: "Test".to_string(),
                description: None,
            },
            schedule: ScheduleConfig {
                initial_phase: "BEFORE".to_string(),
                tick: None,
                targets,
            },
            share: None,
            defaults: None,
        }
    }

    fn validate(config: &ExperienceConfig) -> ValidationResult {
        Validator::new().validate(config, &limits())
    }

    #[test]
    fn valid_config_has_no_issues() {
        let result = validate(&config(vec![
            target("A", "2026-01-01T00:00:00Z"),
            target("B", "2026-01-02T00:00:00Z"),
        ]));
        assert!(!result.has_errors());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn unordered_targets_are_rejected() {
        let result = validate(&config(vec![
            target("A", "2026-01-02T00:00:00Z"),
            target("B", "2026-01-01T00:00:00Z"),
        ]));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "schedule.targets[1].at");
    }

    #[test]
    fn equal_instants_are_rejected() {
        let result = validate(&config(vec![
            target("A", "2026-01-01T00:00:00Z"),
            target("B", "2026-01-01T00:00:00Z"),
        ]));
        assert!(result.has_errors());
    }

    #[test]
    fn bad_instant_and_empty_phase_are_both_reported() {
        let result = validate(&config(vec![target("", "not a date")]));
        let paths: Vec<_> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"schedule.targets[0].phase"));
        assert!(paths.contains(&"schedule.targets[0].at"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = validate(&config(vec![
            target("A", "2026-01-01T00:00:00Z"),
            target("A", "2026-01-02T00:00:00Z"),
        ]));
        assert!(result.errors[0].message.contains("a_start"));
    }

    #[test]
    fn tick_must_parse() {
        let mut c = config(vec![target("A", "2026-01-01T00:00:00Z")]);
        c.schedule.tick = Some("every second".to_string());
        assert!(validate(&c).has_errors());

        c.schedule.tick = Some("5ms".to_string());
        assert!(validate(&c).has_errors());

        c.schedule.tick = Some("5m".to_string());
        let result = validate(&c);
        assert!(!result.has_errors());
        assert_eq!(result.warnings[0].path, "schedule.tick");
    }

    #[test]
    fn too_many_targets() {
        let targets = (1..=5)
            .map(|d| target("P", &format!("2026-01-0{d}T00:00:00Z")))
            .collect();
        let result = validate(&config(targets));
        assert!(result.errors.iter().any(|e| e.path == "schedule.targets"));
    }

    #[test]
    fn empty_targets_warn() {
        let result = validate(&config(vec![]));
        assert!(!result.has_errors());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn share_origin_checks() {
        let mut c = config(vec![target("A", "2026-01-01T00:00:00Z")]);
        c.share = Some(ShareConfig {
            origin: "example.com".to_string(),
            path: "/".to_string(),
            message: None,
        });
        let result = validate(&c);
        assert!(!result.has_errors());
        assert_eq!(result.warnings[0].path, "share.origin");

        c.share = Some(ShareConfig {
            origin: "https://example.com/?x=1".to_string(),
            path: "/".to_string(),
            message: None,
        });
        assert!(validate(&c).has_errors());
    }

    #[test]
    fn partner_defaults_reject_delimiter() {
        let mut c = config(vec![target("A", "2026-01-01T00:00:00Z")]);
        c.defaults = Some(DefaultsConfig {
            partner_a: Some("A|B".to_string()),
            ..DefaultsConfig::default()
        });
        let result = validate(&c);
        assert_eq!(result.errors[0].path, "defaults.partner_a");
    }
}
