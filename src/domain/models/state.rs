//! Per-iteration records and the invocation-wide accumulated state.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::budget::{BudgetMapping, SizeMismatch};

/// Summary of one parse/patch/rerun cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based iteration number within its loop.
    pub iteration: u32,
    pub budget_mismatches: usize,
    pub size_mismatches: usize,
    /// Failing test identifiers known at this iteration.
    pub failing_tests: Vec<String>,
}

/// Everything observed during one invocation of the tool.
///
/// Only ever grows: budget entries merge with last-observation-wins, size
/// mismatches append, modified files union.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulatedState {
    pub budgets: BudgetMapping,
    pub sizes: Vec<SizeMismatch>,
    pub modified_files: BTreeSet<PathBuf>,
}

impl AccumulatedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one parse result into the state.
    pub fn merge(&mut self, budgets: &BudgetMapping, sizes: &[SizeMismatch]) {
        self.budgets.merge(budgets);
        self.sizes.extend_from_slice(sizes);
    }

    pub fn record_modified<I>(&mut self, files: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.modified_files.extend(files);
    }

    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty() && self.sizes.is_empty()
    }
}
