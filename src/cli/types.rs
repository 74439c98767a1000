//! CLI type definitions
//!
//! This module contains the clap structure that defines the CLI interface.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(name = "update-budgets")]
#[command(
    about = "Update expected budgets in test sources until the suite passes",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Parse and report only, don't update files
    #[arg(long = "dry", visible_alias = "dry-run")]
    pub dry_run: bool,

    /// Configuration file (defaults to .budget-sync/config.yaml and local.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the iteration cap per fix loop
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_iterations: Option<u32>,

    /// Output the report in JSON format
    #[arg(short, long)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
