//! PurgeTree: safe recursive deletion from the command line.
//!
//! Thin binary entry point. All logic lives in the `purgetree-core` crate.

use anyhow::Context;
use clap::Parser;
use purgetree_core::deleter::progress::{start_delete, DeleteProgress};
use purgetree_core::resolve::BaseDirResolver;
use purgetree_core::{DeleteError, DeleteReport, DeleteRequest, Deleter, DeleterConfig, WorkResult};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "purgetree", version, about)]
struct Cli {
    /// Paths to delete. Relative paths are resolved against --base-dir
    #[arg(required = true)]
    paths: Vec<String>,

    /// Descend into symlinked directories and delete their contents
    #[arg(long)]
    follow_symlinks: bool,

    /// Directory relative paths are resolved against (default: current directory)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Pause before retrying a failed delete, in milliseconds
    #[arg(long, default_value_t = 10)]
    retry_delay_ms: u64,

    /// Print a JSON report on stdout
    #[arg(long)]
    json: bool,

    /// Log every root and retry
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let resolver = match &cli.base_dir {
        Some(dir) => BaseDirResolver::new(dir),
        None => BaseDirResolver::current_dir()?,
    };
    let deleter = Deleter::new(resolver).with_config(DeleterConfig {
        retry_delay: Duration::from_millis(cli.retry_delay_ms),
    });
    let request = DeleteRequest::new()
        .delete(cli.paths.iter().map(String::as_str))
        .follow_symlinks(cli.follow_symlinks);

    let (roots, result) = match deleter.resolve_roots(&request) {
        Ok(roots) => (roots, run(deleter, request)?),
        // Nothing was deleted, so the report names no roots.
        Err(err) => (Vec::new(), Err(err)),
    };

    let report = DeleteReport::new(roots, &result);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Ok(work) = &result {
        if work.did_work {
            println!("Removed {} entries", work.removed);
        } else {
            println!("Nothing to delete");
        }
    }

    result.map(|_| ()).context("deletion failed")
}

/// Run the deletion on its worker thread, logging progress as it arrives.
fn run(
    deleter: Deleter,
    request: DeleteRequest,
) -> anyhow::Result<Result<WorkResult, DeleteError>> {
    let handle = start_delete(deleter, request).context("failed to spawn deletion thread")?;
    for event in handle.progress_rx.iter() {
        log_progress(&event);
    }
    let (_, result) = handle.wait();
    Ok(result)
}

fn log_progress(event: &DeleteProgress) {
    match event {
        DeleteProgress::RootStarted { path } => tracing::debug!("Deleting {}", path.display()),
        DeleteProgress::RootSkipped { path } => {
            tracing::debug!("Skipped {} (does not exist)", path.display())
        }
        DeleteProgress::Retrying { path } => tracing::debug!("Retrying {}", path.display()),
        DeleteProgress::Failed { path } => tracing::warn!("Could not delete {}", path.display()),
        DeleteProgress::Complete { duration, .. } => tracing::debug!("Finished in {duration:?}"),
        DeleteProgress::Aborted { root, .. } => {
            tracing::debug!("Aborted at {}", root.display())
        }
    }
}
