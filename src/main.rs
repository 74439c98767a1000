//! update-budgets CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use budget_sync::cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;

    match cli::commands::reconcile::execute(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "update-budgets failed");
            cli::handle_error(&err, json);
            ExitCode::FAILURE
        }
    }
}
