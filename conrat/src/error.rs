//! Error types for `conrat`
//!
//! Aggregates the core configuration and catalog errors with the runtime's
//! own failure modes and maps each to a process exit code.

use thiserror::Error;

pub use conrat_core::error::{ConfigError, PuzzleError, Severity, ValidationIssue};

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `conrat` CLI operations.
///
/// A session that reaches the thank-you acknowledgment always exits with
/// [`ExitCode::SUCCESS`]; the other codes only arise at startup or from
/// signals.
pub struct ExitCode;

impl ExitCode {
    /// Session finished, or the command succeeded
    pub const SUCCESS: i32 = 0;

    /// Anything not covered below
    pub const ERROR: i32 = 1;

    /// Experiment file unparseable or rejected by the validator
    pub const CONFIG_ERROR: i32 = 2;

    /// Marker file, stdin or stdout failed
    pub const IO_ERROR: i32 = 3;

    /// Puzzle catalog missing or malformed
    pub const PUZZLE_ERROR: i32 = 4;

    /// Bad flags
    pub const USAGE_ERROR: i32 = 64;

    /// SIGINT
    pub const INTERRUPTED: i32 = 130;

    /// SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `conrat` operations.
#[derive(Debug, Error)]
pub enum ConratError {
    /// Experiment config
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Puzzle catalog error
    #[error(transparent)]
    Puzzle(#[from] PuzzleError),

    /// Marker sink could not be opened
    #[error(transparent)]
    Marker(#[from] MarkerError),

    /// Invalid command-line usage that clap cannot express
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Report or marker serialization
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Raw YAML outside the loader
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConratError {
    /// Process exit status for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Puzzle(_) => ExitCode::PUZZLE_ERROR,
            Self::Marker(_) | Self::Io(_) => ExitCode::IO_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
        }
    }
}

// ============================================================================
// Marker Errors
// ============================================================================

/// Failure to deliver a marker to a sink.
///
/// Markers are best-effort telemetry: the session logs these and carries on.
#[derive(Debug, Error)]
pub enum MarkerError {
    /// Writing to the underlying stream failed
    #[error("marker I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The marker record could not be serialized
    #[error("marker serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A shared sink's lock was poisoned by a panicking holder
    #[error("marker sink lock poisoned")]
    Poisoned,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn config_errors_map_to_config_exit_code() {
        let err = ConratError::from(ConfigError::MissingFile {
            path: PathBuf::from("experiment.yaml"),
        });
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn puzzle_errors_map_to_puzzle_exit_code() {
        let err = ConratError::from(PuzzleError::TooFewGroups {
            required: 4,
            found: 0,
        });
        assert_eq!(err.exit_code(), ExitCode::PUZZLE_ERROR);
        assert!(err.to_string().contains("at least 4"));
    }

    #[test]
    fn io_and_marker_errors_map_to_io_exit_code() {
        let io = ConratError::from(std::io::Error::other("disk full"));
        assert_eq!(io.exit_code(), ExitCode::IO_ERROR);

        let marker = ConratError::from(MarkerError::Poisoned);
        assert_eq!(marker.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn usage_error_code() {
        let err = ConratError::Usage("nothing to validate".to_string());
        assert_eq!(err.exit_code(), ExitCode::USAGE_ERROR);
    }
}
