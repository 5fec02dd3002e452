//! Logging initialization.
//!
//! Diagnostics go to stderr through `tracing`. Stdout is the participant's
//! screen and is never written from here.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable that overrides the `-v` count.
pub const LOG_LEVEL_ENV: &str = "CONRAT_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON, one event per line.
    Json,
}

/// Filter directive for a `-v` count. Saturates at `trace`.
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Whether stderr output should carry ANSI escapes.
#[must_use]
pub const fn wants_ansi(color: ColorChoice, stderr_is_tty: bool, no_color: bool) -> bool {
    match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => stderr_is_tty && !no_color,
    }
}

fn session_filter(verbosity: u8) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_LEVEL_ENV) {
        return filter;
    }
    // The exporter is chatty at debug; keep it at warn unless asked.
    let directive = verbosity_to_directive(verbosity);
    let exporter = if verbosity >= 3 { "trace" } else { "warn" };
    EnvFilter::new(format!(
        "{directive},metrics_exporter_prometheus={exporter}"
    ))
}

/// Installs the global subscriber.
///
/// `CONRAT_LOG_LEVEL` wins over `verbosity`. A second call is a no-op, so
/// tests may call this freely.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let filter = session_filter(verbosity);
    let targets = verbosity >= 2;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(targets)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Human => {
            let ansi = wants_ansi(
                color,
                std::io::stderr().is_terminal(),
                std::env::var_os("NO_COLOR").is_some(),
            );
            builder.with_ansi(ansi).try_init()
        }
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::trace!("subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_is_default() {
        assert_eq!(LogFormat::default(), LogFormat::Human);
    }

    #[test]
    fn second_init_is_harmless() {
        init_logging(LogFormat::Human, 0, ColorChoice::Auto);
        init_logging(LogFormat::Json, 3, ColorChoice::Never);
    }

    #[test]
    fn verbosity_saturates_at_trace() {
        let levels: Vec<_> = [0, 1, 2, 3, 200]
            .into_iter()
            .map(verbosity_to_directive)
            .collect();
        assert_eq!(levels, ["warn", "info", "debug", "trace", "trace"]);
    }

    #[test]
    fn auto_color_needs_tty_and_no_opt_out() {
        assert!(wants_ansi(ColorChoice::Auto, true, false));
        assert!(!wants_ansi(ColorChoice::Auto, true, true));
        assert!(!wants_ansi(ColorChoice::Auto, false, false));
        assert!(wants_ansi(ColorChoice::Always, false, true));
        assert!(!wants_ansi(ColorChoice::Never, true, false));
    }
}
