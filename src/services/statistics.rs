//! Statistics over accumulated budget changes.
//!
//! Pure derivation: nothing here mutates the accumulated state.

use serde::Serialize;

use crate::domain::models::{AccumulatedState, ResourceCost};

/// Signed change from `old` to `new` as a percentage of `old`; zero when
/// `old` is zero.
pub fn percent_change(old: u64, new: u64) -> f64 {
    if old == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let (old, new) = (old as f64, new as f64);
    (new - old) / old * 100.0
}

fn delta(old: u64, new: u64) -> i128 {
    i128::from(new) - i128::from(old)
}

/// One budget entry with its per-component deltas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetDelta {
    pub old: ResourceCost,
    pub new: ResourceCost,
    pub memory_delta: i128,
    pub steps_delta: i128,
    pub memory_percent: f64,
    pub steps_percent: f64,
}

impl BudgetDelta {
    pub fn new(old: ResourceCost, new: ResourceCost) -> Self {
        Self {
            old,
            new,
            memory_delta: delta(old.memory, new.memory),
            steps_delta: delta(old.steps, new.steps),
            memory_percent: percent_change(old.memory, new.memory),
            steps_percent: percent_change(old.steps, new.steps),
        }
    }

    /// Improvement iff neither component grew.
    pub const fn is_improvement(&self) -> bool {
        self.memory_delta <= 0 && self.steps_delta <= 0
    }
}

/// Average and bounds of a set of percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentRange {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

impl PercentRange {
    fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let average = values.iter().sum::<f64>() / values.len() as f64;
        Some(Self {
            average,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// One scalar size change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeDelta {
    pub file_name: String,
    pub line: usize,
    pub old: u64,
    pub new: u64,
    pub percent: f64,
}

/// Aggregate view of every change observed during an invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetStatistics {
    pub total: usize,
    pub improvements: usize,
    pub regressions: usize,
    pub memory: Option<PercentRange>,
    pub steps: Option<PercentRange>,
    pub sizes: Vec<SizeDelta>,
    /// Regressed entries, only populated when regressions exist.
    pub regressed: Vec<BudgetDelta>,
}

impl BudgetStatistics {
    pub fn from_state(state: &AccumulatedState) -> Self {
        let deltas: Vec<BudgetDelta> = state
            .budgets
            .iter()
            .map(|(old, new)| BudgetDelta::new(*old, *new))
            .collect();

        let memory: Vec<f64> = deltas.iter().map(|d| d.memory_percent).collect();
        let steps: Vec<f64> = deltas.iter().map(|d| d.steps_percent).collect();
        let improvements = deltas.iter().filter(|d| d.is_improvement()).count();

        let sizes = state
            .sizes
            .iter()
            .map(|m| SizeDelta {
                file_name: m.file_name.clone(),
                line: m.line,
                old: m.expected,
                new: m.actual,
                percent: percent_change(m.expected, m.actual),
            })
            .collect();

        Self {
            total: deltas.len(),
            improvements,
            regressions: deltas.len() - improvements,
            memory: PercentRange::of(&memory),
            steps: PercentRange::of(&steps),
            sizes,
            regressed: deltas.into_iter().filter(|d| !d.is_improvement()).collect(),
        }
    }

    /// Nothing was observed at all.
    pub fn is_empty(&self) -> bool {
        self.total == 0 && self.sizes.is_empty()
    }
}
