//! `validate`: run the loaders and report what they found.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, DEFAULTS_ORIGIN};
use crate::error::{ConfigError, ConratError};
use crate::puzzles::{JsonFilePuzzleSource, PuzzleSource};

#[derive(Debug, Serialize)]
struct Report {
    config: ConfigReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    puzzles: Option<PuzzleReport>,
}

#[derive(Debug, Serialize)]
struct ConfigReport {
    source: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PuzzleReport {
    source: String,
    valid: bool,
    groups: usize,
    duplicates_dropped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Checks the configuration (or the built-in defaults) and, when given, the
/// puzzle catalog.
///
/// # Errors
///
/// Returns the first loader error after the report has been printed, so
/// the exit code reflects what failed.
pub fn run(args: &ValidateArgs) -> Result<(), ConratError> {
    let config = super::config_path(args.config.as_deref());
    let (report, failure) = check(config.as_deref(), args.puzzles.as_deref());
    match args.format {
        OutputFormat::Human => print!("{}", render_human(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    failure.map_or(Ok(()), Err)
}

fn check(config: Option<&Path>, puzzles: Option<&Path>) -> (Report, Option<ConratError>) {
    let mut failure: Option<ConratError> = None;

    let source = config.map_or_else(|| DEFAULTS_ORIGIN.to_string(), |p| p.display().to_string());
    let config_report = match ConfigLoader::with_defaults().load_or_default(config) {
        Ok(result) => ConfigReport {
            source,
            valid: true,
            errors: Vec::new(),
            warnings: result
                .warnings
                .iter()
                .map(|w| match &w.location {
                    Some(at) => format!("{} at {at}", w.message),
                    None => w.message.clone(),
                })
                .collect(),
        },
        Err(e) => {
            let errors = match &e {
                ConfigError::ValidationError { errors, .. } => {
                    errors.iter().map(|i| format!("{} at {}", i.message, i.path)).collect()
                }
                other => vec![other.to_string()],
            };
            failure = Some(e.into());
            ConfigReport {
                source,
                valid: false,
                errors,
                warnings: Vec::new(),
            }
        }
    };

    let puzzle_report = puzzles.map(|path| {
        let source = path.display().to_string();
        match JsonFilePuzzleSource::new(path).load() {
            Ok(catalog) => PuzzleReport {
                source,
                valid: true,
                groups: catalog.len(),
                duplicates_dropped: catalog.duplicates_dropped(),
                error: None,
            },
            Err(e) => {
                let message = e.to_string();
                failure.get_or_insert(e.into());
                PuzzleReport {
                    source,
                    valid: false,
                    groups: 0,
                    duplicates_dropped: 0,
                    error: Some(message),
                }
            }
        }
    });

    (
        Report {
            config: config_report,
            puzzles: puzzle_report,
        },
        failure,
    )
}

fn render_human(report: &Report) -> String {
    let mut out = String::new();
    let c = &report.config;
    out.push_str(&format!(
        "config {}: {}\n",
        c.source,
        if c.valid { "ok" } else { "invalid" }
    ));
    for e in &c.errors {
        out.push_str(&format!("  error: {e}\n"));
    }
    for w in &c.warnings {
        out.push_str(&format!("  warning: {w}\n"));
    }

    if let Some(p) = &report.puzzles {
        match &p.error {
            None => out.push_str(&format!(
                "puzzles {}: ok ({} groups, {} duplicates dropped)\n",
                p.source, p.groups, p.duplicates_dropped
            )),
            Some(e) => out.push_str(&format!("puzzles {}: invalid\n  error: {e}\n", p.source)),
        }
    }
    out
}
