//! CLI command dispatch and handlers

pub mod completions;
pub mod run;
pub mod validate;
pub mod version;

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands};
use crate::config::discover;
use crate::error::ConratError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), ConratError> {
    match cli.command {
        Commands::Run(args) => run::run(&args, cancel).await,
        Commands::Validate(args) => validate::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// `--config` if given, else `conrat.yaml` in the working directory.
fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(|| {
        let found = std::env::current_dir().ok().and_then(|dir| discover(&dir));
        if let Some(path) = &found {
            tracing::info!(path = %path.display(), "using discovered experiment config");
        }
        found
    })
}
