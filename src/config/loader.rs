//! Experience file loader.
//!
//! Loading pipeline:
//! 1. Size limit
//! 2. UTF-8 BOM strip
//! 3. Environment variable expansion (on raw text)
//! 4. YAML parsing
//! 5. Deserialization to typed config
//! 6. Validation
//! 7. Freeze with `Arc`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::schema::ExperienceConfig;
use crate::config::validation::Validator;
use crate::error::ConfigError;

// ============================================================================
// Public API
// ============================================================================

/// Options for the loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Size limits.
    pub config_limits: ConfigLimits,
}

/// Limits that keep a hostile or mistaken file from exhausting resources.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum number of schedule targets.
    pub max_targets: usize,

    /// Maximum configuration file size in bytes.
    pub max_config_size: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_targets: env_or("KEEPSAKE_MAX_TARGETS", 100),
            max_config_size: env_or("KEEPSAKE_MAX_CONFIG_SIZE", 1024 * 1024),
        }
    }
}

/// A loaded, validated experience.
#[derive(Debug)]
pub struct LoadResult {
    /// The frozen configuration.
    pub config: Arc<ExperienceConfig>,

    /// Non-fatal issues found while loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning produced while loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Where it occurred.
    pub location: Option<String>,
}

/// Experience file loader.
#[derive(Debug)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Loads and validates the experience file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or exceeds the size limit
    /// - A required environment variable is unset
    /// - YAML parsing or deserialization fails
    /// - Validation reports errors
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let max = self.options.config_limits.max_config_size;
        let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if file_size > max {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{file_size} bytes"),
                expected: format!("at most {max} bytes"),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        self.load_text(&raw, path)
    }

    /// Loads an experience from YAML text.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus file access.
    pub fn load_from_str(&self, yaml: &str) -> Result<LoadResult, ConfigError> {
        let max = self.options.config_limits.max_config_size;
        if yaml.len() > max {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{} bytes", yaml.len()),
                expected: format!("at most {max} bytes"),
            });
        }
        self.load_text(yaml, Path::new("<string>"))
    }

    fn load_text(&self, raw: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let mut env_sub = EnvSubstitution::new();
        let substituted = env_sub.substitute(raw, path)?;
        warnings.extend(env_sub.warnings);

        let root: serde_yaml::Value =
            serde_yaml::from_str(&substituted).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        if root.is_null() {
            return Err(ConfigError::ParseError {
                path: path.to_path_buf(),
                line: None,
                message: "Configuration file is empty".to_string(),
            });
        }

        let config: ExperienceConfig =
            serde_yaml::from_value(root).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: None,
                message: format!("Failed to deserialize configuration: {e}"),
            })?;

        let result = Validator::new().validate(&config, &self.options.config_limits);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: result.errors,
            });
        }

        warnings.extend(result.warnings.into_iter().map(|issue| LoadWarning {
            message: issue.message,
            location: Some(issue.path),
        }));

        tracing::debug!(
            path = %path.display(),
            experience = %config.experience.name,
            targets = config.schedule.targets.len(),
            warnings = warnings.len(),
            "experience loaded"
        );

        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Pre-parse environment variable substitution.
///
/// Runs on raw YAML text before parsing so substituted values keep YAML
/// type inference.
struct EnvSubstitution {
    warnings: Vec<LoadWarning>,
}

type VarSpec = (String, Option<String>, Option<String>);

impl EnvSubstitution {
    const fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Supports:
    /// - `${VAR}`: value, or empty string with a warning if unset
    /// - `${VAR:-default}`: `default` if unset
    /// - `${VAR:?message}`: error if unset
    /// - `$$`: literal `$`
    fn substitute(&mut self, raw: &str, source_path: &Path) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                result.push(c);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                Some('{') => {
                    chars.next();
                    let (name, default, required) = Self::parse_var_spec(&mut chars, source_path)?;

                    match std::env::var(&name) {
                        Ok(value) => result.push_str(&value),
                        Err(_) => {
                            if let Some(default) = default {
                                result.push_str(&default);
                            } else if let Some(message) = required {
                                return Err(ConfigError::EnvVarNotSet {
                                    var: name,
                                    location: format!("{}: {message}", source_path.display()),
                                });
                            } else {
                                self.warnings.push(LoadWarning {
                                    message: format!(
                                        "Environment variable '{name}' is not set, using empty string"
                                    ),
                                    location: Some(source_path.display().to_string()),
                                });
                            }
                        }
                    }
                }
                _ => result.push(c),
            }
        }

        Ok(result)
    }

    /// Parses the inside of `${...}` into (name, default, required message).
    fn parse_var_spec(
        chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
        source_path: &Path,
    ) -> Result<VarSpec, ConfigError> {
        let mut name = String::new();

        while let Some(c) = chars.next() {
            match c {
                '}' => return Ok((name, None, None)),
                ':' => match chars.peek() {
                    Some('-') => {
                        chars.next();
                        let default = Self::read_until_close(chars, source_path)?;
                        return Ok((name, Some(default), None));
                    }
                    Some('?') => {
                        chars.next();
                        let message = Self::read_until_close(chars, source_path)?;
                        return Ok((name, None, Some(message)));
                    }
                    _ => name.push(':'),
                },
                _ => name.push(c),
            }
        }

        Err(ConfigError::ParseError {
            path: source_path.to_path_buf(),
            line: None,
            message: format!("Unclosed environment variable reference: ${{{name}"),
        })
    }

    /// Reads until the matching `}`, allowing nested braces.
    fn read_until_close(
        chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
        source_path: &Path,
    ) -> Result<String, ConfigError> {
        let mut value = String::new();
        let mut depth = 1;

        for c in chars.by_ref() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(value);
                    }
                }
                _ => {}
            }
            value.push(c);
        }

        Err(ConfigError::ParseError {
            path: PathBuf::from(source_path),
            line: None,
            message: "Unclosed environment variable reference".to_string(),
        })
    }
}

/// Parses an environment variable with a default value.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Tests
// ============================================================================
