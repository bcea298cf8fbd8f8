//! Error types for `keepsake`
//!
//! Every fallible library operation returns one of the domain enums below.
//! Token decoding in the library yields `None` on failure; only the CLI turns
//! that into [`LinkError::Undecodable`].

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `keepsake` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Phase error (unordered targets, unparseable instant)
    pub const PHASE_ERROR: i32 = 5;

    /// Link error (payload cannot be encoded, token does not decode)
    pub const LINK_ERROR: i32 = 6;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `keepsake` operations.
///
/// Aggregates the domain errors and maps each one to an exit code.
#[derive(Debug, Error)]
pub enum KeepsakeError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Phase target error
    #[error(transparent)]
    Phase(#[from] PhaseError),

    /// Link codec error
    #[error(transparent)]
    Link(#[from] LinkError),

    /// Point cloud generation error
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Invalid command-line usage
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KeepsakeError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => ExitCode::CONFIG_ERROR,
            Self::Phase(_) => ExitCode::PHASE_ERROR,
            Self::Link(_) => ExitCode::LINK_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Shape(_) | Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Experience file loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}")]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced at {location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Location in the configuration where it was referenced
        location: String,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found while checking an experience file.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "schedule.targets[1].at")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - prevents the experience from being used
    Error,
    /// Warning - suspicious, but the experience still loads
    Warning,
}

// ============================================================================
// Phase Errors
// ============================================================================

/// Errors raised while building a phase target set.
///
/// Evaluating and scheduling never fail; only construction does.
#[derive(Debug, Error)]
pub enum PhaseError {
    /// Targets are not strictly increasing in time
    #[error("target '{name}' at {at} does not follow the previous target at {previous}")]
    UnorderedTargets {
        /// Name of the offending target
        name: String,
        /// Its instant
        at: String,
        /// Instant of the target before it
        previous: String,
    },

    /// A phase or target label is empty
    #[error("empty label: {0}")]
    EmptyLabel(String),

    /// An instant could not be parsed
    #[error("invalid instant '{0}' (expected RFC 3339 or YYYY-MM-DD[THH:MM:SS])")]
    InvalidInstant(String),

    /// A local time does not exist or is ambiguous in the chosen zone
    #[error("local time {0} is ambiguous or does not exist")]
    AmbiguousLocalTime(String),

    /// A duration could not be parsed
    #[error("invalid duration '{value}': {message}")]
    InvalidDuration {
        /// The duration text
        value: String,
        /// Parser message
        message: String,
    },
}

// ============================================================================
// Link Errors
// ============================================================================

/// Errors raised while building a personalization payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    /// A couple-card field contains the field delimiter
    #[error("field '{field}' must not contain '{delimiter}'")]
    DelimiterInField {
        /// Which field
        field: &'static str,
        /// The reserved delimiter
        delimiter: char,
    },

    /// A token did not decode to the requested payload
    #[error("token does not decode to a {0} payload")]
    Undecodable(&'static str),
}

// ============================================================================
// Shape Errors
// ============================================================================

/// Point cloud generation errors.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// Requested point count exceeds the configured limit
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Invalid shape parameters
    #[error("invalid shape parameters: {0}")]
    InvalidParameters(String),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `keepsake` operations.
pub type Result<T> = std::result::Result<T, KeepsakeError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::SUCCESS, 0);
        assert_eq!(ExitCode::ERROR, 1);
        assert_eq!(ExitCode::CONFIG_ERROR, 2);
        assert_eq!(ExitCode::IO_ERROR, 3);
        assert_eq!(ExitCode::PHASE_ERROR, 5);
        assert_eq!(ExitCode::LINK_ERROR, 6);
        assert_eq!(ExitCode::USAGE_ERROR, 64);
        assert_eq!(ExitCode::INTERRUPTED, 130);
        assert_eq!(ExitCode::TERMINATED, 143);
    }

    #[test]
    fn test_phase_error_exit_code() {
        let err: KeepsakeError = PhaseError::EmptyLabel("initial_phase".to_string()).into();
        assert_eq!(err.exit_code(), ExitCode::PHASE_ERROR);
    }

    #[test]
    fn test_link_error_exit_code() {
        let err: KeepsakeError = LinkError::Undecodable("couple").into();
        assert_eq!(err.exit_code(), ExitCode::LINK_ERROR);
    }

    #[test]
    fn test_config_error_exit_code() {
        let err: KeepsakeError = ConfigError::MissingFile {
            path: PathBuf::from("/test"),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_io_error_exit_code() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: KeepsakeError = io_err.into();
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn test_usage_error_exit_code() {
        let err = KeepsakeError::Usage("--name or --partner-a".to_string());
        assert_eq!(err.exit_code(), ExitCode::USAGE_ERROR);
    }

    #[test]
    fn test_validation_issue_display() {
        let issue = ValidationIssue {
            path: "schedule.targets[1]".to_string(),
            message: "targets out of order".to_string(),
            severity: Severity::Error,
        };
        assert_eq!(
            issue.to_string(),
            "error: targets out of order at schedule.targets[1]"
        );
    }

    #[test]
    fn test_validation_issue_warning_display() {
        let issue = ValidationIssue {
            path: "share.origin".to_string(),
            message: "origin is not https".to_string(),
            severity: Severity::Warning,
        };
        assert_eq!(
            issue.to_string(),
            "warning: origin is not https at share.origin"
        );
    }

    #[test]
    fn test_delimiter_error_display() {
        let err = LinkError::DelimiterInField {
            field: "partner_a",
            delimiter: '|',
        };
        assert_eq!(err.to_string(), "field 'partner_a' must not contain '|'");
    }

    #[test]
    fn test_config_error_env_var_display() {
        let err = ConfigError::EnvVarNotSet {
            var: "WEDDING_DATE".to_string(),
            location: "line 4".to_string(),
        };
        assert!(err.to_string().contains("WEDDING_DATE"));
        assert!(err.to_string().contains("line 4"));
    }
}
