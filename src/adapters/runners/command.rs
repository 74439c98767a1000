//! Command-line test runner.
//!
//! Spawns `<binary> <task>` in the project root and captures both streams.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{RunOutput, RunnerConfig};
use crate::domain::ports::TestRunner;

/// Command test runner configuration.
#[derive(Debug, Clone)]
pub struct CommandRunnerConfig {
    /// Runner executable, e.g. `sbtn`
    pub binary: String,
    /// Working directory for every invocation
    pub working_dir: PathBuf,
    /// Per-invocation timeout
    pub timeout: Duration,
}

impl CommandRunnerConfig {
    pub fn from_runner_config(config: &RunnerConfig, working_dir: PathBuf) -> Self {
        Self {
            binary: config.binary.clone(),
            working_dir,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl Default for CommandRunnerConfig {
    fn default() -> Self {
        Self::from_runner_config(&RunnerConfig::default(), PathBuf::from("."))
    }
}

/// Runs tests by invoking an external command.
pub struct CommandTestRunner {
    config: CommandRunnerConfig,
}

impl CommandTestRunner {
    pub fn new(config: CommandRunnerConfig) -> Self {
        Self { config }
    }

    fn display_command(&self, task: &str) -> String {
        format!("{} {}", self.config.binary, task)
    }
}

#[async_trait]
impl TestRunner for CommandTestRunner {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn run(&self, task: &str) -> DomainResult<RunOutput> {
        let command = self.display_command(task);
        info!(command = %command, "running tests");

        let child = Command::new(&self.config.binary)
            .arg(task)
            .current_dir(&self.config.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DomainError::RunnerSpawn {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        let output = timeout(self.config.timeout, child.wait_with_output())
            .await
            .map_err(|_| DomainError::RunnerTimeout {
                command: command.clone(),
                timeout_secs: self.config.timeout.as_secs(),
            })?
            .map_err(|e| DomainError::RunnerSpawn {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        let exit_code = output.status.code().unwrap_or(-1);

        debug!(command = %command, exit_code, bytes = text.len(), "test run finished");
        Ok(RunOutput::new(text, exit_code))
    }
}
