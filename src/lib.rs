//! budget-sync - automatic reconciliation of test budget assertions
//!
//! After an optimisation changes the execution cost of the code under test,
//! budget assertions in the test suite start failing with "expected X but got
//! Y" messages. budget-sync runs the suite, parses those messages, rewrites
//! the expected literals in the test sources and reruns the failing tests
//! until the suite passes or no further progress is possible.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): value types, ports and errors
//! - **Service Layer** (`services`): literal codec, failure parser,
//!   replacement engine, statistics, rerun scope routing
//! - **Application Layer** (`application`): the convergence controller
//! - **Adapters** (`adapters`): test runner process and file system
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use budget_sync::adapters::filesystem::LocalSourceTree;
//! use budget_sync::adapters::runners::{CommandRunnerConfig, CommandTestRunner};
//! use budget_sync::application::{ConvergenceController, RunMode};
//! use budget_sync::domain::models::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let runner = Arc::new(CommandTestRunner::new(CommandRunnerConfig::default()));
//!     let sources = Arc::new(LocalSourceTree::from_config(&config));
//!     let controller = ConvergenceController::from_config(runner, sources, &config)?;
//!
//!     let report = controller.run(RunMode::DryRun).await?;
//!     println!("{} budget changes", report.statistics.total);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{ConvergenceController, LoopOutcome, ReconcileReport, RunMode, StallReason};
pub use domain::models::{
    AccumulatedState, BudgetMapping, Config, IterationRecord, ResourceCost, RunOutput,
    SizeMismatch,
};
pub use domain::ports::{SourceTree, TestRunner};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{BudgetStatistics, FailureParser, ReplacementEngine};
