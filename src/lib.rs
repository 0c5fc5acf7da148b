//! comiclink - comic library organizer
//!
//! Scans comic archives (`.cbz`, `.cbr`, `.pdf`), reads the ComicInfo.xml
//! descriptor inside each one, and publishes a tree of symlinks named
//! `<series>/<volume>.<title>.<ext>` that points at the best copy of every
//! issue. Files without a descriptor are linked by their directory name,
//! links whose targets vanished are removed, and a summary of the run is
//! posted to a webhook.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod groups;
pub mod logging;
pub mod metadata;
pub mod notify;
pub mod pipeline;
pub mod progress;
pub mod publish;
pub mod reaper;
pub mod sanitize;
pub mod scanner;
pub mod stats;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::config::Config;
use crate::error::ExitCode;
use crate::notify::Notifier;
use crate::pipeline::{Pipeline, PipelineConfig};
use crate::progress::Progress;
use crate::stats::RunStats;

/// Run the application with parsed command-line arguments.
///
/// Logging is initialized here, so this must be called once per process.
///
/// # Errors
///
/// Returns an error for invalid configuration and for failures that stop
/// the run (an unwritable destination tree). Per-file problems and a failed
/// notification only turn the exit code into [`ExitCode::PartialSuccess`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);

    let config = Config::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .apply_cli(&cli);
    config.validate().context("Invalid configuration")?;
    log::debug!("Configuration: {:?}", config);

    let stats = run(&config, cli.quiet)?;
    for line in stats.report().lines() {
        log::info!("{}", line);
    }

    let mut exit_code = if stats.has_errors() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    };

    if !deliver_report(&config, &stats) {
        exit_code = ExitCode::PartialSuccess;
    }

    Ok(exit_code)
}

/// Execute the walk, publish and cleanup phases for `config`.
///
/// # Errors
///
/// Returns an error if the configuration cannot be turned into a pipeline
/// or a phase fails as a whole.
pub fn run(config: &Config, quiet: bool) -> Result<RunStats> {
    let pipeline_config = PipelineConfig::new(
        config.source_dirs.clone(),
        config.destination_root.clone(),
    )
    .with_walker_config(config.walker_config())
    .with_classifier(config.classifier()?)
    .with_threads(config.threads)
    .with_cleanup(config.cleanup)
    .with_progress_callback(Arc::new(Progress::new(quiet)));

    Pipeline::new(pipeline_config).run().with_context(|| {
        format!(
            "Failed to publish into {}",
            config.destination_root.display()
        )
    })
}

/// Post the report if notifications are configured.
///
/// Returns `false` only when delivery was attempted and failed.
fn deliver_report(config: &Config, stats: &RunStats) -> bool {
    if !config.should_notify() {
        log::info!("Webhook notification skipped");
        return true;
    }

    match Notifier::new(config.webhook_url.as_str()).and_then(|n| n.send_report(stats)) {
        Ok(()) => {
            log::info!("Notification sent successfully");
            true
        }
        Err(e) => {
            log::error!("Failed to send notification: {}", e);
            false
        }
    }
}
