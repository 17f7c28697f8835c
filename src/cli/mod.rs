//! CLI layer: argument parsing, logging setup, Ctrl-C teardown and the count command.

pub(crate) mod args;

pub(crate) use args::Cli;

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use clap::Parser;
use tracing::{info, warn};

use ccount::pipeline::Pipeline;
use ccount::{CcountError, repo_base_name};

use crate::render;

/// Exit status after Ctrl-C, as shells report SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

// ─── Main entry point ───────────────────────────────────────────────

pub fn run() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.max_log_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let start = Instant::now();
    let result = cmd_count(&cli);
    eprintln!("Elapsed: {:.2}s", start.elapsed().as_secs_f64());

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_count(cli: &Cli) -> Result<(), CcountError> {
    let options = cli.run_options();
    info!(
        repo = %options.repo.display(),
        cache = %options.cache_root.display(),
        counter = %options.counter,
        "Counting lines of code"
    );

    let active_clone = install_interrupt_handler();
    let pipeline = Pipeline::new(options).on_clone(move |path| {
        if let Ok(mut slot) = active_clone.lock() {
            *slot = Some(path.to_path_buf());
        }
    });
    let outcome = pipeline.run()?;

    let repo_name = fs::canonicalize(&cli.repo)
        .map(|p| repo_base_name(&p))
        .unwrap_or_else(|_| repo_base_name(&cli.repo));
    let title = format!("Lines of code: {}", repo_name);
    render::write_chart(&cli.output, &outcome.series, &pipeline.options().languages, &title)?;

    eprintln!(
        "Measured {} commits ({} cached, {} counted{}). Chart written to {}",
        outcome.records.len(),
        outcome.stats.hits,
        outcome.stats.misses,
        if outcome.reused_collection { ", reused previous run" } else { "" },
        cli.output.display()
    );
    Ok(())
}

/// Remove the disposable clone (if one exists yet) and exit on Ctrl-C.
/// Returns the slot the pipeline fills with the clone path.
fn install_interrupt_handler() -> Arc<Mutex<Option<PathBuf>>> {
    let active: Arc<Mutex<Option<PathBuf>>> = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&active);

    let installed = ctrlc::set_handler(move || {
        if let Some(path) = slot.lock().ok().and_then(|guard| guard.clone()) {
            let _ = fs::remove_dir_all(path);
        }
        eprintln!("Interrupted");
        std::process::exit(INTERRUPTED_EXIT_CODE);
    });
    if let Err(e) = installed {
        warn!(error = %e, "Could not install Ctrl-C handler; an interrupted run may leave its clone behind");
    }
    active
}
