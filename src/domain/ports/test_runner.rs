//! Test runner port - interface to the external test runner.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::RunOutput;

/// Trait for external test runner implementations.
///
/// The runner is a black box: it receives a task string (a full-suite task
/// or a scoped "run these identifiers" task) and returns the combined text
/// output with the exit status. A non-zero status means the output should
/// be parsed for mismatches.
#[async_trait]
pub trait TestRunner: Send + Sync {
    /// Get the runner name for logging.
    fn name(&self) -> &'static str;

    /// Run a task to completion.
    ///
    /// Timeouts and spawn failures are returned as errors and are fatal for
    /// the invocation.
    async fn run(&self, task: &str) -> DomainResult<RunOutput>;
}
