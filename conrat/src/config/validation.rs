//! Configuration validation
//!
//! Runs on the deserialized [`ExperimentConfig`] and collects every issue
//! rather than stopping at the first, so one run reports everything wrong
//! with a file.

use std::collections::HashSet;

use conrat_core::config::{ExperimentConfig, RatItem};

use crate::error::{Severity, ValidationIssue};

/// Upper bound on Connections blocks.
pub const MAX_BLOCKS: u32 = 100;

/// Upper bound on any countdown window, in seconds.
pub const MAX_WINDOW_SECONDS: u32 = 600;

/// Solved-display delays above this draw a warning.
pub const SOLVED_DISPLAY_WARN_MS: u64 = 10_000;

/// Questionnaires longer than this draw a warning.
pub const QUESTIONS_WARN: usize = 20;

/// Cue words per RAT item.
pub const RAT_CUES: usize = 3;

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
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

    /// Validates a configuration and returns every issue found.
    pub fn validate(&mut self, config: &ExperimentConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_connections(config);
        self.validate_rat(config);
        self.validate_questionnaire(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Sections
    // ========================================================================

    fn validate_connections(&mut self, config: &ExperimentConfig) {
        let c = &config.connections;
        if c.blocks == 0 {
            self.add_error("connections.blocks", "must be at least 1");
        } else if c.blocks > MAX_BLOCKS {
            self.add_error(
                "connections.blocks",
                &format!("must be at most {MAX_BLOCKS}, got {}", c.blocks),
            );
        }
        self.check_window("connections.rest_seconds", c.rest_seconds);

        if c.solved_display_ms > SOLVED_DISPLAY_WARN_MS {
            self.add_warning(
                "connections.solved_display_ms",
                &format!(
                    "solved group stays on screen for {} ms; more than {SOLVED_DISPLAY_WARN_MS} ms delays every rest",
                    c.solved_display_ms
                ),
            );
        }
    }

    fn validate_rat(&mut self, config: &ExperimentConfig) {
        let rat = &config.rat;
        self.check_window("rat.think_seconds", rat.think_seconds);
        self.check_window("rat.rest_seconds", rat.rest_seconds);

        if rat.items.is_empty() {
            self.add_error("rat.items", "must contain at least one item");
            return;
        }

        let mut answers = HashSet::new();
        for (i, item) in rat.items.iter().enumerate() {
            self.validate_rat_item(i, item);
            let answer = item.answer.trim().to_lowercase();
            if !answer.is_empty() && !answers.insert(answer) {
                self.add_warning(
                    &format!("rat.items[{i}].answer"),
                    &format!("answer '{}' repeats an earlier item", item.answer.trim()),
                );
            }
        }
    }

    fn validate_rat_item(&mut self, index: usize, item: &RatItem) {
        if item.cues.len() != RAT_CUES {
            self.add_error(
                &format!("rat.items[{index}].cues"),
                &format!("expected {RAT_CUES} cue words, found {}", item.cues.len()),
            );
        } else if item.cues.iter().any(|c| c.trim().is_empty()) {
            self.add_error(
                &format!("rat.items[{index}].cues"),
                "cue words must not be empty",
            );
        }
        if item.answer.trim().is_empty() {
            self.add_error(
                &format!("rat.items[{index}].answer"),
                "answer must not be empty",
            );
        }
    }

    fn validate_questionnaire(&mut self, config: &ExperimentConfig) {
        let questions = &config.questionnaire.questions;
        if questions.is_empty() {
            self.add_error("questionnaire.questions", "must contain at least one question");
            return;
        }
        for (i, q) in questions.iter().enumerate() {
            if q.trim().is_empty() {
                self.add_error(
                    &format!("questionnaire.questions[{i}]"),
                    "question text must not be empty",
                );
            }
        }
        if questions.len() > QUESTIONS_WARN {
            self.add_warning(
                "questionnaire.questions",
                &format!(
                    "{} questions is unusually long (> {QUESTIONS_WARN})",
                    questions.len()
                ),
            );
        }
    }

    fn check_window(&mut self, path: &str, seconds: u32) {
        if seconds == 0 {
            self.add_error(path, "must be at least 1 second");
        } else if seconds > MAX_WINDOW_SECONDS {
            self.add_error(
                path,
                &format!("must be at most {MAX_WINDOW_SECONDS} seconds, got {seconds}"),
            );
        }
    }

    // ========================================================================
    // Helpers
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
