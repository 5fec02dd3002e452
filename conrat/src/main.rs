//! `conrat` binary

use clap::Parser;
use tokio_util::sync::CancellationToken;

use conrat::cli::args::Cli;
use conrat::cli::commands;
use conrat::error::ExitCode;
use conrat::observability::init_logging;

/// Resolves with the exit code of the first SIGINT or SIGTERM.
async fn shutdown_signal() -> i32 {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = tokio::signal::ctrl_c() => ExitCode::INTERRUPTED,
                _ = sigterm.recv() => ExitCode::TERMINATED,
            },
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
                ExitCode::INTERRUPTED
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        ExitCode::INTERRUPTED
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    let cancel = CancellationToken::new();
    let result = tokio::select! {
        result = commands::dispatch(cli, cancel.clone()) => result,
        code = shutdown_signal() => {
            cancel.cancel();
            eprintln!("\nsession interrupted");
            std::process::exit(code);
        }
    };

    match result {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
