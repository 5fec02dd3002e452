//! `run`: one experiment session on this terminal.

use tokio_util::sync::CancellationToken;

use crate::cli::args::RunArgs;
use crate::config::ConfigLoader;
use crate::error::ConratError;
use crate::experiment::SessionController;
use crate::frontend::TerminalPresenter;
use crate::markers::{ConsoleSink, FanoutSink, JsonlSink, MarkerSink};
use crate::observability::init_metrics;
use crate::puzzles::{JsonFilePuzzleSource, PuzzleSource};
use crate::runtime::{SessionEnd, TokioScheduler, run_session};

/// Loads everything, then runs the session until it finishes, stdin closes,
/// or `cancel` fires.
///
/// # Errors
///
/// Returns an error if the configuration or puzzle catalog fails to load,
/// the marker file cannot be created, the metrics exporter cannot bind, or
/// terminal I/O fails. Nothing is shown to the participant before loading
/// succeeds.
pub async fn run(args: &RunArgs, cancel: CancellationToken) -> Result<(), ConratError> {
    let config = super::config_path(args.config.as_deref());
    let loaded = ConfigLoader::with_defaults().load_or_default(config.as_deref())?;
    for warning in &loaded.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    let catalog = JsonFilePuzzleSource::new(&args.puzzles).load()?;

    init_metrics(args.metrics_port)?;
    let sink = build_sink(args)?;

    let (scheduler, mut timers) = TokioScheduler::new(&cancel);
    let mut controller = SessionController::new(loaded.config, catalog, scheduler, sink);
    let mut presenter = TerminalPresenter::stdout();
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());

    let end = run_session(&mut controller, &mut timers, stdin, &mut presenter, &cancel).await?;
    tracing::info!(
        outcome = ?end,
        phase = %controller.phase(),
        markers = controller.markers_emitted(),
        "session ended"
    );
    if end == SessionEnd::EndOfInput {
        controller.session().log_summary();
    }
    Ok(())
}

/// JSONL file and/or console. Markers go to the console when no file is
/// given.
fn build_sink(args: &RunArgs) -> Result<Box<dyn MarkerSink>, ConratError> {
    let mut fanout = FanoutSink::new();
    if let Some(path) = &args.markers {
        fanout = fanout.with(Box::new(JsonlSink::create(path)?));
        tracing::info!(path = %path.display(), "writing markers");
    }
    if args.console_markers || args.markers.is_none() {
        fanout = fanout.with(Box::new(ConsoleSink::stderr()));
    }
    Ok(Box::new(fanout))
}
