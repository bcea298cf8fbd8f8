//! `validate`: check experience files without running them.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::ConfigLoader;
use crate::error::{ConfigError, KeepsakeError, Severity, ValidationIssue};

/// Per-file outcome.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    valid: bool,
    errors: Vec<IssueReport>,
    warnings: Vec<IssueReport>,
}

#[derive(Debug, Serialize)]
struct IssueReport {
    path: String,
    message: String,
}

impl From<&ValidationIssue> for IssueReport {
    fn from(issue: &ValidationIssue) -> Self {
        Self {
            path: issue.path.clone(),
            message: issue.message.clone(),
        }
    }
}

/// Validates every file in `args.files`, reporting all of them before
/// failing.
///
/// # Errors
///
/// Returns an I/O error for a missing file, and the first configuration
/// error otherwise. With `--strict`, warnings fail validation too.
pub fn run(args: &ValidateArgs) -> Result<(), KeepsakeError> {
    let mut reports = Vec::with_capacity(args.files.len());
    let mut first_failure: Option<KeepsakeError> = None;

    for path in &args.files {
        if !path.exists() {
            return Err(KeepsakeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            )));
        }
        tracing::info!(file = %path.display(), "validating experience");

        let (report, failure) = check_file(path, args.strict);
        if first_failure.is_none() {
            first_failure = failure;
        }
        reports.push(report);
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Human => {
            for report in &reports {
                print_human(report);
            }
        }
    }

    first_failure.map_or(Ok(()), Err)
}

fn check_file(path: &Path, strict: bool) -> (FileReport, Option<KeepsakeError>) {
    let file = path.display().to_string();

    match ConfigLoader::with_defaults().load(path) {
        Ok(loaded) => {
            let warnings: Vec<IssueReport> = loaded
                .warnings
                .iter()
                .map(|w| IssueReport {
                    path: w.location.clone().unwrap_or_default(),
                    message: w.message.clone(),
                })
                .collect();

            let failure = (strict && !warnings.is_empty()).then(|| {
                KeepsakeError::Config(ConfigError::ValidationError {
                    path: file.clone(),
                    errors: warnings
                        .iter()
                        .map(|w| ValidationIssue {
                            path: w.path.clone(),
                            message: w.message.clone(),
                            severity: Severity::Error,
                        })
                        .collect(),
                })
            });

            let report = FileReport {
                valid: failure.is_none(),
                file,
                errors: Vec::new(),
                warnings,
            };
            (report, failure)
        }
        Err(ConfigError::ValidationError { path: p, errors }) => {
            let report = FileReport {
                file,
                valid: false,
                errors: errors.iter().map(IssueReport::from).collect(),
                warnings: Vec::new(),
            };
            let failure = ConfigError::ValidationError { path: p, errors };
            (report, Some(failure.into()))
        }
        Err(other) => {
            let report = FileReport {
                file,
                valid: false,
                errors: vec![IssueReport {
                    path: String::new(),
                    message: other.to_string(),
                }],
                warnings: Vec::new(),
            };
            (report, Some(other.into()))
        }
    }
}

fn print_human(report: &FileReport) {
    if report.valid {
        println!("ok    {}", report.file);
    } else {
        println!("FAIL  {}", report.file);
    }
    for issue in &report.errors {
        println!("  error: {} at {}", issue.message, display_path(&issue.path));
    }
    for issue in &report.warnings {
        println!("  warning: {} at {}", issue.message, display_path(&issue.path));
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}
