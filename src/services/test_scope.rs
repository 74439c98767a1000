//! Routing of failing test identifiers to scoped rerun tasks.
//!
//! A multi-project build cannot run every test class from one task, so
//! failing identifiers are bucketed by naming convention and each bucket is
//! rerun through its own subproject task.

use crate::domain::models::{ScopeRule, ScopesConfig};

/// One runner invocation covering a bucket of test identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedRun {
    pub task: String,
    pub tests: Vec<String>,
}

impl ScopedRun {
    /// Task string handed to the runner, e.g. `scalusJVM/testOnly a.BTest c.DTest`.
    pub fn command(&self) -> String {
        format!("{} {}", self.task, self.tests.join(" "))
    }
}

fn rule_matches(rule: &ScopeRule, test_id: &str) -> bool {
    rule.contains.iter().any(|needle| test_id.contains(needle.as_str()))
        || rule.prefixes.iter().any(|prefix| test_id.starts_with(prefix.as_str()))
}

/// Buckets identifiers by the first matching rule; unmatched ones go to the
/// default task.
#[derive(Debug, Clone)]
pub struct TestScopeRouter {
    default_task: String,
    rules: Vec<ScopeRule>,
}

impl TestScopeRouter {
    pub fn new(config: &ScopesConfig) -> Self {
        Self {
            default_task: config.default_task.clone(),
            rules: config.rules.clone(),
        }
    }

    /// Task that `test_id` would be rerun with.
    pub fn classify(&self, test_id: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| rule_matches(rule, test_id))
            .map_or(self.default_task.as_str(), |rule| rule.task.as_str())
    }

    /// Split `tests` into runs: default scope first, then rules in order.
    /// Empty buckets are dropped; identifier order within a bucket is kept.
    pub fn route(&self, tests: &[String]) -> Vec<ScopedRun> {
        let mut buckets: Vec<ScopedRun> = std::iter::once(&self.default_task)
            .chain(self.rules.iter().map(|r| &r.task))
            .map(|task| ScopedRun {
                task: task.clone(),
                tests: Vec::new(),
            })
            .collect();

        for test_id in tests {
            let slot = self
                .rules
                .iter()
                .position(|rule| rule_matches(rule, test_id))
                .map_or(0, |idx| idx + 1);
            buckets[slot].tests.push(test_id.clone());
        }

        buckets.retain(|run| !run.tests.is_empty());
        buckets
    }
}
