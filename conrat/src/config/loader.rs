//! Configuration loader
//!
//! Pipeline: size check, read, BOM strip, `${VAR}` expansion, YAML parse,
//! typed deserialize, validation, freeze. Any stage can fail with a
//! [`ConfigError`]; warnings from every stage are collected into the
//! [`LoadResult`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use conrat_core::config::ExperimentConfig;
use serde_yaml::Value;

use super::validation::Validator;
use crate::error::{ConfigError, ValidationIssue};

/// Name shown in errors for the built-in configuration.
pub const DEFAULTS_ORIGIN: &str = "<defaults>";

// ============================================================================
// Options
// ============================================================================

/// Options for the configuration loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Resource limits
    pub limits: ConfigLimits,
}

/// Resource limits applied while loading.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Largest accepted configuration file, in bytes
    /// (`CONRAT_MAX_CONFIG_SIZE`)
    pub max_config_size: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_config_size: env_or("CONRAT_MAX_CONFIG_SIZE", 1024 * 1024),
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// A validated, frozen configuration plus anything worth telling the user.
#[derive(Debug)]
pub struct LoadResult {
    /// The configuration, shared read-only with the controller
    pub config: Arc<ExperimentConfig>,

    /// Non-fatal issues
    pub warnings: Vec<LoadWarning>,
}

/// A non-fatal issue found while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// What was found
    pub message: String,

    /// Field path or file it relates to
    pub location: Option<String>,
}

impl From<ValidationIssue> for LoadWarning {
    fn from(issue: ValidationIssue) -> Self {
        Self {
            message: issue.message,
            location: Some(issue.path),
        }
    }
}

// ============================================================================
// Loader
// ============================================================================

/// Loads [`ExperimentConfig`] from YAML files.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a loader with default limits.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or too large, an environment
    /// reference is unclosed or required but unset, the YAML is malformed,
    /// empty or has unknown fields, or validation finds errors.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let limit = self.options.limits.max_config_size;
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > limit {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{size} bytes"),
                expected: format!("at most {limit} bytes"),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        tracing::debug!(path = %path.display(), bytes = raw.len(), "loading configuration");
        self.load_str(&raw, path)
    }

    /// Loads and validates configuration text. `origin` names it in errors.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigLoader::load`], minus the file checks.
    pub fn load_str(&self, raw: &str, origin: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        let parse_error = |line: Option<usize>, message: String| ConfigError::ParseError {
            path: origin.to_path_buf(),
            line,
            message,
        };

        let mut expander = EnvExpander::default();
        let expanded = expander.expand(raw).map_err(|e| match e {
            ExpandError::Unclosed { name } => parse_error(
                line_of(raw, &name),
                format!("unclosed environment reference '${{{name}'"),
            ),
            ExpandError::Required { var, message } => ConfigError::EnvVarNotSet { var, message },
        })?;
        let mut warnings: Vec<LoadWarning> = expander
            .unset
            .into_iter()
            .map(|var| LoadWarning {
                message: format!("environment variable '{var}' is not set, using empty string"),
                location: Some(origin.display().to_string()),
            })
            .collect();

        let root: Value = serde_yaml::from_str(&expanded)
            .map_err(|e| parse_error(e.location().map(|l| l.line()), e.to_string()))?;
        if root.is_null() {
            return Err(parse_error(None, "configuration file is empty".to_string()));
        }

        let config: ExperimentConfig = serde_yaml::from_value(root)
            .map_err(|e| parse_error(None, format!("invalid configuration: {e}")))?;

        let frozen = self.finish(config, &origin.display().to_string())?;
        warnings.extend(frozen.warnings);
        Ok(LoadResult {
            config: frozen.config,
            warnings,
        })
    }

    /// Validates and returns the built-in configuration.
    ///
    /// # Errors
    ///
    /// Only if the built-in values themselves fail validation.
    pub fn defaults(&self) -> Result<LoadResult, ConfigError> {
        self.finish(ExperimentConfig::default(), DEFAULTS_ORIGIN)
    }

    /// Loads `path` when given, the built-in configuration otherwise.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load`].
    pub fn load_or_default(&self, path: Option<&Path>) -> Result<LoadResult, ConfigError> {
        path.map_or_else(|| self.defaults(), |p| self.load(p))
    }

    #[allow(clippy::unused_self)]
    fn finish(&self, config: ExperimentConfig, origin: &str) -> Result<LoadResult, ConfigError> {
        let result = Validator::new().validate(&config);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: origin.to_string(),
                errors: result.errors,
            });
        }
        Ok(LoadResult {
            config: Arc::new(config),
            warnings: result.warnings.into_iter().map(LoadWarning::from).collect(),
        })
    }
}

// ============================================================================
// Environment Expansion
// ============================================================================

#[derive(Debug)]
enum ExpandError {
    Unclosed { name: String },
    Required { var: String, message: String },
}

/// Expands environment references in raw text before YAML parsing.
///
/// - `${VAR}` expands to the value, or to nothing (recorded in `unset`)
/// - `${VAR:-default}` falls back to `default`
/// - `${VAR:?message}` fails when unset
/// - `$$` is a literal `$`
#[derive(Debug, Default)]
struct EnvExpander {
    unset: Vec<String>,
}

impl EnvExpander {
    fn expand(&mut self, raw: &str) -> Result<String, ExpandError> {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;

        while let Some(at) = rest.find('$') {
            out.push_str(&rest[..at]);
            let after = &rest[at + 1..];
            if let Some(tail) = after.strip_prefix('$') {
                out.push('$');
                rest = tail;
            } else if let Some(body) = after.strip_prefix('{') {
                let Some(close) = closing_brace(body) else {
                    let name = body.split([':', '}', '\n']).next().unwrap_or_default();
                    return Err(ExpandError::Unclosed {
                        name: name.to_string(),
                    });
                };
                out.push_str(&self.resolve(&body[..close])?);
                rest = &body[close + 1..];
            } else {
                out.push('$');
                rest = after;
            }
        }
        out.push_str(rest);
        Ok(out)
    }

    fn resolve(&mut self, spec: &str) -> Result<String, ExpandError> {
        let (name, fallback) = match spec.split_once(":-") {
            Some((name, default)) => (name, Fallback::Default(default)),
            None => match spec.split_once(":?") {
                Some((name, message)) => (name, Fallback::Required(message)),
                None => (spec, Fallback::Empty),
            },
        };

        if let Ok(value) = std::env::var(name) {
            return Ok(value);
        }
        match fallback {
            Fallback::Default(default) => Ok(default.to_string()),
            Fallback::Required(message) => Err(ExpandError::Required {
                var: name.to_string(),
                message: message.to_string(),
            }),
            Fallback::Empty => {
                self.unset.push(name.to_string());
                Ok(String::new())
            }
        }
    }
}

enum Fallback<'a> {
    Default(&'a str),
    Required(&'a str),
    Empty,
}

/// Byte offset of the `}` closing a reference, allowing nested braces in
/// defaults.
fn closing_brace(body: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn line_of(raw: &str, name: &str) -> Option<usize> {
    let needle = format!("${{{name}");
    raw.lines().position(|l| l.contains(&needle)).map(|i| i + 1)
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Default configuration path used when `--config` is absent and
/// `conrat.yaml` exists in the working directory.
#[must_use]
pub fn discover(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join("conrat.yaml");
    candidate.is_file().then_some(candidate)
}
