//! Mock test runner for testing.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::RunOutput;
use crate::domain::ports::TestRunner;

/// Scripted test runner.
///
/// Each call pops the next scripted response; once the script is exhausted
/// every call returns the fallback. All task strings are recorded.
pub struct MockTestRunner {
    script: Mutex<VecDeque<DomainResult<RunOutput>>>,
    fallback: RunOutput,
    calls: Mutex<Vec<String>>,
}

impl MockTestRunner {
    /// Runner whose every call passes with empty output.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: RunOutput::passed(""),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Runner that plays `responses` in order, then passes.
    pub fn with_script(responses: impl IntoIterator<Item = RunOutput>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(Ok).collect()),
            ..Self::new()
        }
    }

    /// Replace the response used once the script runs out.
    #[must_use]
    pub fn with_fallback(mut self, fallback: RunOutput) -> Self {
        self.fallback = fallback;
        self
    }

    /// Queue another response.
    pub async fn push(&self, response: RunOutput) {
        self.script.lock().await.push_back(Ok(response));
    }

    /// Queue an error, e.g. a timeout.
    pub async fn push_error(&self, error: DomainError) {
        self.script.lock().await.push_back(Err(error));
    }

    /// Task strings received so far, in call order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

impl Default for MockTestRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TestRunner for MockTestRunner {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn run(&self, task: &str) -> DomainResult<RunOutput> {
        self.calls.lock().await.push(task.to_string());
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_then_fallback() {
        let runner = MockTestRunner::with_script([RunOutput::failed("boom")])
            .with_fallback(RunOutput::new("later", 3));

        assert_eq!(runner.run("a").await.unwrap(), RunOutput::failed("boom"));
        assert_eq!(runner.run("b").await.unwrap(), RunOutput::new("later", 3));
        assert_eq!(runner.run("c").await.unwrap(), RunOutput::new("later", 3));
        assert_eq!(runner.calls().await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_scripted_error() {
        let runner = MockTestRunner::new();
        runner
            .push_error(DomainError::RunnerTimeout {
                command: "sbtn quick".to_string(),
                timeout_secs: 1,
            })
            .await;

        assert!(matches!(
            runner.run("quick").await,
            Err(DomainError::RunnerTimeout { .. })
        ));
        assert!(runner.run("quick").await.unwrap().success());
        assert_eq!(runner.call_count().await, 2);
    }
}
