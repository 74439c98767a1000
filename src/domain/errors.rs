//! Domain errors for the budget reconciliation pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Domain-level errors that can occur while reconciling budgets.
///
/// Every variant is fatal for the current invocation. Recoverable conditions
/// (budget mismatches, stalls, non-convergence) are modelled as loop outcomes,
/// not errors.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Malformed numeric literal: {0:?}")]
    MalformedLiteral(String),

    #[error("Failed to start test runner `{command}`: {reason}")]
    RunnerSpawn { command: String, reason: String },

    #[error("Test runner `{command}` timed out after {timeout_secs}s")]
    RunnerTimeout { command: String, timeout_secs: u64 },

    #[error("Failed to read {path}: {reason}")]
    FileRead { path: PathBuf, reason: String },

    #[error("Failed to write {path}: {reason}")]
    FileWrite { path: PathBuf, reason: String },

    #[error("Failed to enumerate test sources under {path}: {reason}")]
    SourceDiscovery { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
