//! Implementation of the `update-budgets` command.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::adapters::filesystem::LocalSourceTree;
use crate::adapters::runners::{CommandRunnerConfig, CommandTestRunner};
use crate::application::{ConvergenceController, RunMode};
use crate::cli::display::{output, ReconcileOutput};
use crate::cli::types::Cli;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};

/// Load configuration and apply command-line overrides.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    if let Some(max_iterations) = cli.max_iterations {
        config.max_iterations = max_iterations;
    }
    Ok(config)
}

pub async fn execute(cli: Cli) -> Result<ExitCode> {
    let config = resolve_config(&cli)?;

    let log_config = LogConfig::from_settings(&config.logging, cli.verbose)?;
    let _logger = LoggerImpl::init(&log_config).context("Failed to initialize logging")?;
    debug!(?config, "configuration loaded");

    let runner = Arc::new(CommandTestRunner::new(CommandRunnerConfig::from_runner_config(
        &config.runner,
        config.project_root.clone(),
    )));
    let sources = Arc::new(LocalSourceTree::from_config(&config));
    let controller = ConvergenceController::from_config(runner, sources, &config)
        .context("Failed to build reconciliation pipeline")?;

    let mode = if cli.dry_run {
        RunMode::DryRun
    } else {
        RunMode::Apply
    };
    let report = controller
        .run(mode)
        .await
        .context("Budget reconciliation aborted")?;

    let exit = report.exit_code();
    output(&ReconcileOutput::new(report, config.literal_name), cli.json);

    Ok(if exit == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
