//! ConvergenceController - run -> parse -> patch -> rerun until the suite passes
//!
//! Drives the external test runner and the replacement engine with:
//! - A bounded primary fix loop over the first failing run
//! - Stall detection for non-budget failures and unrecognised formats
//! - Scoped reruns of the failing test classes
//! - A final full-suite verification with one more bounded fix cycle
//!
//! All progress is carried in an explicit [`AccumulatedState`] that each loop
//! takes by value and hands back, so the controller holds no mutable state.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AccumulatedState, Config, IterationRecord, RunOutput};
use crate::domain::ports::{SourceTree, TestRunner};
use crate::services::failure_parser::{failing_tests, FailureParser};
use crate::services::replacement_engine::ReplacementEngine;
use crate::services::statistics::BudgetStatistics;
use crate::services::test_scope::TestScopeRouter;

/// Whether files are patched or only inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Apply,
    DryRun,
}

/// Why a fix loop gave up before the suite passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StallReason {
    /// Tests fail but nothing budget-shaped was found in the output.
    NonBudgetFailure,
    /// Mismatches were parsed but no source file changed.
    FormatDrift,
}

/// Terminal state of one fix loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoopOutcome {
    Converged,
    Stalled { reason: StallReason },
    Exhausted,
}

/// What one fix loop did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopReport {
    pub outcome: LoopOutcome,
    pub iterations: Vec<IterationRecord>,
    /// Identifiers still known to fail when the loop stopped.
    pub failing_tests: Vec<String>,
}

/// Final result of a controller invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub mode: RunMode,
    /// Primary fix loop; `None` when the first run passed or in dry run.
    pub primary: Option<LoopReport>,
    /// Fix loop run against the final verification output, if one was needed.
    pub retry: Option<LoopReport>,
    /// Iteration record of the single dry-run parse.
    pub dry_run_iteration: Option<IterationRecord>,
    pub success: bool,
    pub state: AccumulatedState,
    pub statistics: BudgetStatistics,
    /// Files a dry run would have modified.
    pub pending_files: BTreeSet<PathBuf>,
    /// Failing identifiers from the last full-suite run when unsuccessful.
    pub failing_tests: Vec<String>,
}

impl ReconcileReport {
    pub const fn exit_code(&self) -> i32 {
        if self.success {
            0
        } else {
            1
        }
    }
}

/// Controller settings.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Iteration cap per fix loop.
    pub max_iterations: u32,
    /// Runner task for the whole suite.
    pub full_suite_task: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            full_suite_task: "quick".to_string(),
        }
    }
}

/// Orchestrates repeated parse/patch/rerun cycles against a test runner.
pub struct ConvergenceController {
    runner: Arc<dyn TestRunner>,
    sources: Arc<dyn SourceTree>,
    parser: FailureParser,
    engine: ReplacementEngine,
    router: TestScopeRouter,
    config: ControllerConfig,
}

impl ConvergenceController {
    pub fn new(
        runner: Arc<dyn TestRunner>,
        sources: Arc<dyn SourceTree>,
        parser: FailureParser,
        engine: ReplacementEngine,
        router: TestScopeRouter,
        config: ControllerConfig,
    ) -> Self {
        Self {
            runner,
            sources,
            parser,
            engine,
            router,
            config,
        }
    }

    /// Build a controller with parser, engine and router derived from `config`.
    pub fn from_config(
        runner: Arc<dyn TestRunner>,
        sources: Arc<dyn SourceTree>,
        config: &Config,
    ) -> DomainResult<Self> {
        Ok(Self::new(
            runner,
            sources,
            FailureParser::new(&config.literal_name, &config.source_extension)?,
            ReplacementEngine::new(&config.literal_name)?,
            TestScopeRouter::new(&config.scopes),
            ControllerConfig {
                max_iterations: config.max_iterations,
                full_suite_task: config.runner.full_suite_task.clone(),
            },
        ))
    }

    /// Run one full invocation.
    pub async fn run(&self, mode: RunMode) -> DomainResult<ReconcileReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "reconcile",
            run_id = %run_id,
            mode = ?mode,
            runner = self.runner.name()
        );
        self.reconcile(run_id, mode).instrument(span).await
    }

    async fn reconcile(&self, run_id: Uuid, mode: RunMode) -> DomainResult<ReconcileReport> {
        let started_at = Utc::now();
        let timer = Instant::now();
        let mut report = ReconcileReport {
            run_id,
            started_at,
            elapsed_ms: 0,
            mode,
            primary: None,
            retry: None,
            dry_run_iteration: None,
            success: false,
            state: AccumulatedState::new(),
            statistics: BudgetStatistics::default(),
            pending_files: BTreeSet::new(),
            failing_tests: Vec::new(),
        };

        info!("running full suite");
        let first = self.run_full_suite().await?;
        if first.success() {
            info!("all tests passed, nothing to update");
            report.success = true;
            return Ok(finish(report, timer));
        }

        if mode == RunMode::DryRun {
            let (state, record, pending) = self.inspect(report.state, &first).await?;
            report.state = state;
            report.dry_run_iteration = Some(record);
            report.pending_files = pending;
            report.success = true;
            return Ok(finish(report, timer));
        }

        let (state, primary) = self.fix_loop(report.state, first).await?;
        report.state = state;
        if primary.outcome == LoopOutcome::Exhausted {
            warn!(
                max_iterations = self.config.max_iterations,
                "did not converge within the iteration cap"
            );
        }
        report.primary = Some(primary);

        info!("final verification with full suite");
        let mut last = self.run_full_suite().await?;
        if last.success() {
            report.success = true;
            return Ok(finish(report, timer));
        }

        if !self.parser.parse(&last.output)?.is_empty() {
            info!("full suite reports further mismatches, running another fix cycle");
            let (state, retry) = self.fix_loop(report.state, last).await?;
            report.state = state;
            report.retry = Some(retry);

            last = self.run_full_suite().await?;
            if last.success() {
                report.success = true;
                return Ok(finish(report, timer));
            }
        }

        report.failing_tests = failing_tests(&last.output);
        warn!(
            failing = ?report.failing_tests,
            "some tests still failing after all iterations"
        );
        Ok(finish(report, timer))
    }

    /// Dry-run counterpart of one iteration: parse, accumulate, and compute
    /// which files would change.
    async fn inspect(
        &self,
        mut state: AccumulatedState,
        run: &RunOutput,
    ) -> DomainResult<(AccumulatedState, IterationRecord, BTreeSet<PathBuf>)> {
        let parsed = self.parser.parse(&run.output)?;
        let record = IterationRecord {
            iteration: 1,
            budget_mismatches: parsed.budgets.len(),
            size_mismatches: parsed.sizes.len(),
            failing_tests: failing_tests(&run.output),
        };
        state.merge(&parsed.budgets, &parsed.sizes);
        let pending = self
            .engine
            .preview(self.sources.as_ref(), &parsed.budgets, &parsed.sizes)
            .await?;
        info!(files = pending.len(), "dry run, not updating files");
        Ok((state, record, pending))
    }

    /// Fix loop starting from a failed run.
    ///
    /// Takes the accumulated state by value and returns it grown with every
    /// mismatch observed and file modified in this loop.
    pub async fn fix_loop(
        &self,
        mut state: AccumulatedState,
        mut run: RunOutput,
    ) -> DomainResult<(AccumulatedState, LoopReport)> {
        let mut failing: Vec<String> = Vec::new();
        let mut iterations = Vec::new();

        for iteration in 1..=self.config.max_iterations {
            let parsed = self.parser.parse(&run.output)?;
            let reported = failing_tests(&run.output);
            // Scoped reruns sometimes omit the summary block.
            if !reported.is_empty() {
                failing = reported;
            }

            info!(
                iteration,
                budgets = parsed.budgets.len(),
                sizes = parsed.sizes.len(),
                failing = ?failing,
                "fix iteration"
            );
            iterations.push(IterationRecord {
                iteration,
                budget_mismatches: parsed.budgets.len(),
                size_mismatches: parsed.sizes.len(),
                failing_tests: failing.clone(),
            });

            if parsed.is_empty() {
                let outcome = if failing.is_empty() {
                    LoopOutcome::Converged
                } else {
                    warn!("no budget mismatches found but tests still failing");
                    LoopOutcome::Stalled {
                        reason: StallReason::NonBudgetFailure,
                    }
                };
                return Ok((state, LoopReport { outcome, iterations, failing_tests: failing }));
            }

            state.merge(&parsed.budgets, &parsed.sizes);

            let updated = self
                .engine
                .apply(self.sources.as_ref(), &parsed.budgets, &parsed.sizes)
                .await?;
            if updated.is_empty() {
                warn!("no files updated despite mismatches, unrecognised literal format?");
                let outcome = LoopOutcome::Stalled {
                    reason: StallReason::FormatDrift,
                };
                return Ok((state, LoopReport { outcome, iterations, failing_tests: failing }));
            }
            state.record_modified(updated);

            run = self.rerun(&failing).await?;
            if run.success() {
                info!(iteration, "previously failing tests now pass");
                return Ok((
                    state,
                    LoopReport {
                        outcome: LoopOutcome::Converged,
                        iterations,
                        failing_tests: Vec::new(),
                    },
                ));
            }
        }

        Ok((
            state,
            LoopReport {
                outcome: LoopOutcome::Exhausted,
                iterations,
                failing_tests: failing,
            },
        ))
    }

    /// Rerun the failing classes by scope, or the whole suite when unknown.
    async fn rerun(&self, failing: &[String]) -> DomainResult<RunOutput> {
        if failing.is_empty() {
            debug!("failing classes unknown, rerunning full suite");
            return self.run_full_suite().await;
        }

        let mut combined = RunOutput::passed("");
        for scoped in self.router.route(failing) {
            let command = scoped.command();
            info!(task = %scoped.task, tests = scoped.tests.len(), "rerunning scoped tests");
            combined.absorb(self.runner.run(&command).await?);
        }
        Ok(combined)
    }

    async fn run_full_suite(&self) -> DomainResult<RunOutput> {
        self.runner.run(&self.config.full_suite_task).await
    }
}

fn finish(mut report: ReconcileReport, timer: Instant) -> ReconcileReport {
    report.statistics = BudgetStatistics::from_state(&report.state);
    report.elapsed_ms = u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::filesystem::InMemorySourceTree;
    use crate::adapters::runners::MockTestRunner;
    use crate::domain::models::ResourceCost;

    const BUDGET_FILE: &str = "core/BudgetTest.scala";

    fn controller(
        runner: Arc<MockTestRunner>,
        sources: Arc<InMemorySourceTree>,
        max_iterations: u32,
    ) -> ConvergenceController {
        let mut config = Config::default();
        config.max_iterations = max_iterations;
        ConvergenceController::from_config(runner, sources, &config).unwrap()
    }

    fn mismatch_output(old: (u64, u64), new: (u64, u64)) -> String {
        format!(
            "[info] - eval *** FAILED ***\n\
             [info]   ExUnits({}, {}) did not equal ExUnits({}, {})\n\
             [error] Failed tests:\n\
             [error] \tscalus.uplc.BudgetTest\n",
            new.0, new.1, old.0, old.1
        )
    }

    #[tokio::test]
    async fn test_passing_suite_makes_no_changes() {
        let runner = Arc::new(MockTestRunner::new());
        let sources = Arc::new(InMemorySourceTree::new());

        let report = controller(runner.clone(), sources.clone(), 25)
            .run(RunMode::Apply)
            .await
            .unwrap();

        assert!(report.success);
        assert!(report.primary.is_none());
        assert_eq!(runner.calls().await, vec!["quick".to_string()]);
        assert_eq!(sources.write_count(), 0);
    }

    #[tokio::test]
    async fn test_non_budget_failure_stalls_without_edits() {
        let output = "[error] Failed tests:\n[error] \tscalus.uplc.NullTest\n";
        let runner = Arc::new(MockTestRunner::new().with_fallback(RunOutput::failed(output)));
        let sources = Arc::new(InMemorySourceTree::from_files([(
            BUDGET_FILE,
            "ExUnits(memory = 10, steps = 20)",
        )]));

        let report = controller(runner, sources.clone(), 25)
            .run(RunMode::Apply)
            .await
            .unwrap();

        let primary = report.primary.as_ref().unwrap();
        assert_eq!(
            primary.outcome,
            LoopOutcome::Stalled {
                reason: StallReason::NonBudgetFailure
            }
        );
        assert_eq!(primary.iterations.len(), 1);
        assert!(report.retry.is_none());
        assert!(!report.success);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.failing_tests, vec!["scalus.uplc.NullTest".to_string()]);
        assert_eq!(sources.write_count(), 0);
    }

    #[tokio::test]
    async fn test_fix_loop_retains_failing_tests_when_rerun_omits_them() {
        let runner = Arc::new(MockTestRunner::with_script([
            RunOutput::failed("ExUnits(8, 18) did not equal ExUnits(9, 19)"),
            RunOutput::passed(""),
        ]));
        let sources = Arc::new(InMemorySourceTree::from_files([(
            BUDGET_FILE,
            "a = ExUnits(10, 20)\nb = ExUnits(9, 19)\n",
        )]));
        let controller = controller(runner.clone(), sources.clone(), 25);

        let (state, report) = controller
            .fix_loop(
                AccumulatedState::new(),
                RunOutput::failed(mismatch_output((10, 20), (9, 19))),
            )
            .await
            .unwrap();

        assert_eq!(report.outcome, LoopOutcome::Converged);
        assert_eq!(report.iterations.len(), 2);
        assert_eq!(
            report.iterations[1].failing_tests,
            vec!["scalus.uplc.BudgetTest".to_string()]
        );
        assert_eq!(
            runner.calls().await,
            vec![
                "scalusJVM/testOnly scalus.uplc.BudgetTest".to_string(),
                "scalusJVM/testOnly scalus.uplc.BudgetTest".to_string(),
            ]
        );
        assert_eq!(state.budgets.len(), 2);
        assert_eq!(
            sources.content(BUDGET_FILE).await.unwrap(),
            "a = ExUnits(memory = 8, steps = 18)\nb = ExUnits(memory = 8, steps = 18)\n"
        );
        assert_eq!(
            state.budgets.get(&ResourceCost::new(9, 19)),
            Some(&ResourceCost::new(8, 18))
        );
    }

    #[tokio::test]
    async fn test_exhausts_iteration_cap() {
        // Every rerun reports a fresh mismatch for the literal just written.
        let runner = Arc::new(MockTestRunner::with_script([
            RunOutput::failed(mismatch_output((2, 2), (3, 3))),
            RunOutput::failed(mismatch_output((3, 3), (4, 4))),
            RunOutput::failed(mismatch_output((4, 4), (5, 5))),
        ]));
        let sources = Arc::new(InMemorySourceTree::from_files([(BUDGET_FILE, "ExUnits(1, 1)")]));
        let controller = controller(runner, sources.clone(), 3);

        let (state, report) = controller
            .fix_loop(
                AccumulatedState::new(),
                RunOutput::failed(mismatch_output((1, 1), (2, 2))),
            )
            .await
            .unwrap();

        assert_eq!(report.outcome, LoopOutcome::Exhausted);
        assert_eq!(report.iterations.len(), 3);
        assert_eq!(report.failing_tests, vec!["scalus.uplc.BudgetTest".to_string()]);
        assert_eq!(state.budgets.len(), 3);
        assert_eq!(sources.write_count(), 3);
    }
}
