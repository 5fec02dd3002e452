//! Core error types for `conrat`
//!
//! Configuration, validation and puzzle-catalog errors shared across the
//! workspace.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Config
// ============================================================================

/// Failure to turn an experiment file into an
/// [`ExperimentConfig`](crate::config::ExperimentConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file is not valid YAML, or does not match the schema
    #[error("{path}{}: cannot parse experiment config: {message}", line.map_or_else(String::new, |l| format!(":{l}")))]
    ParseError {
        /// Experiment file
        path: PathBuf,
        /// 1-based line, when the parser reports one
        line: Option<usize>,
        /// Parser message
        message: String,
    },

    /// One or more fields failed validation
    #[error("{path}: experiment config rejected: {}", summarize(.errors))]
    ValidationError {
        /// Experiment file, or `<defaults>`
        path: String,
        /// Every error-severity issue found
        errors: Vec<ValidationIssue>,
    },

    /// The experiment file does not exist or cannot be read
    #[error("experiment config not found: {path}")]
    MissingFile {
        /// Path that was tried
        path: PathBuf,
    },

    /// A setting outside what the loader accepts
    #[error("{field} = {value} is not allowed (expected {expected})")]
    InvalidValue {
        /// Setting name
        field: String,
        /// Offending value, rendered
        value: String,
        /// Accepted range or form
        expected: String,
    },

    /// `${VAR:?message}` named an unset variable
    #[error("${{{var}}} is required: {message}")]
    EnvVarNotSet {
        /// Variable name
        var: String,
        /// Text after `:?`
        message: String,
    },
}

fn summarize(errors: &[ValidationIssue]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One finding from the validator.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Dotted field path, e.g. `rat.items[3].cues`
    pub path: String,
    /// What is wrong
    pub message: String,
    /// Whether it blocks loading
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} ({tag})", self.path, self.message)
    }
}

/// How much a [`ValidationIssue`] matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Loading fails
    Error,
    /// Logged; loading continues
    Warning,
}

// ============================================================================
// Puzzle Catalog Errors
// ============================================================================

/// Errors raised while loading or validating the Connections catalog.
///
/// All of these are fatal at startup: no session begins without a usable
/// catalog.
#[derive(Debug, Error)]
pub enum PuzzleError {
    /// The catalog file does not exist or cannot be read
    #[error("puzzle catalog not found: {path}")]
    MissingFile {
        /// Path that was tried
        path: PathBuf,
    },

    /// The catalog is not valid JSON of the expected shape
    #[error("puzzle catalog {path} is malformed: {message}")]
    Parse {
        /// Path to the catalog
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// A group entry violates the catalog contract
    #[error("puzzle group #{index} ('{label}') is malformed: {reason}")]
    MalformedGroup {
        /// Zero-based position in the source list
        index: usize,
        /// Group label as read (may be empty)
        label: String,
        /// What is wrong with it
        reason: String,
    },

    /// Fewer distinct groups than a single puzzle needs
    #[error("puzzle catalog needs at least {required} distinct groups, found {found}")]
    TooFewGroups {
        /// Groups required per puzzle
        required: usize,
        /// Distinct groups available
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_leads_with_field_path() {
        let issue = ValidationIssue {
            path: "rat.think_seconds".to_string(),
            message: "must be at least 1".to_string(),
            severity: Severity::Error,
        };
        assert_eq!(
            issue.to_string(),
            "rat.think_seconds: must be at least 1 (error)"
        );
    }

    #[test]
    fn validation_error_lists_issues() {
        let err = ConfigError::ValidationError {
            path: "experiment.yaml".to_string(),
            errors: vec![
                ValidationIssue {
                    path: "connections.blocks".to_string(),
                    message: "must be at least 1".to_string(),
                    severity: Severity::Error,
                },
                ValidationIssue {
                    path: "questionnaire.questions".to_string(),
                    message: "must not be empty".to_string(),
                    severity: Severity::Error,
                },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("connections.blocks"));
        assert!(text.contains("questionnaire.questions"));
    }

    #[test]
    fn parse_error_includes_line_when_known() {
        let err = ConfigError::ParseError {
            path: PathBuf::from("x.yaml"),
            line: Some(4),
            message: "bad indent".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "x.yaml:4: cannot parse experiment config: bad indent"
        );
    }

    #[test]
    fn required_env_names_variable() {
        let err = ConfigError::EnvVarNotSet {
            var: "SEED".to_string(),
            message: "set a seed".to_string(),
        };
        assert_eq!(err.to_string(), "${SEED} is required: set a seed");
    }

    #[test]
    fn too_few_groups_message() {
        let err = PuzzleError::TooFewGroups {
            required: 4,
            found: 2,
        };
        assert!(err.to_string().contains("at least 4"));
    }
}
