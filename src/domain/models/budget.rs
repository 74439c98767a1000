//! Budget value types: paired resource costs, old->new mappings and scalar
//! size mismatches.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Paired execution cost asserted by a budget test (memory units, step units).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceCost {
    pub memory: u64,
    pub steps: u64,
}

impl ResourceCost {
    pub const fn new(memory: u64, steps: u64) -> Self {
        Self { memory, steps }
    }
}

impl fmt::Display for ResourceCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.memory, self.steps)
    }
}

/// One entry of a [`BudgetMapping`], in serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetChange {
    /// Cost currently written in the test source (the "expected" side).
    pub old: ResourceCost,
    /// Cost observed by the test run (the "actual" side).
    pub new: ResourceCost,
}

/// Mapping from the cost expected in source to the cost observed at runtime.
///
/// Keys are unique; inserting an already-present key replaces its value so the
/// most recent observation wins. Iteration order is the key order, which keeps
/// reports deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<BudgetChange>", from = "Vec<BudgetChange>")]
pub struct BudgetMapping {
    entries: BTreeMap<ResourceCost, ResourceCost>,
}

impl BudgetMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `old` (expected) was observed as `new` (actual).
    pub fn insert(&mut self, old: ResourceCost, new: ResourceCost) -> Option<ResourceCost> {
        self.entries.insert(old, new)
    }

    pub fn get(&self, old: &ResourceCost) -> Option<&ResourceCost> {
        self.entries.get(old)
    }

    pub fn contains_key(&self, old: &ResourceCost) -> bool {
        self.entries.contains_key(old)
    }

    /// Whether `cost` appears on either side of any entry.
    pub fn mentions(&self, cost: &ResourceCost) -> bool {
        self.entries.contains_key(cost) || self.entries.values().any(|v| v == cost)
    }

    /// Fold `other` into `self`; entries of `other` overwrite existing keys.
    pub fn merge(&mut self, other: &Self) {
        self.entries
            .extend(other.entries.iter().map(|(old, new)| (*old, *new)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ResourceCost, ResourceCost> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a BudgetMapping {
    type Item = (&'a ResourceCost, &'a ResourceCost);
    type IntoIter = btree_map::Iter<'a, ResourceCost, ResourceCost>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(ResourceCost, ResourceCost)> for BudgetMapping {
    fn from_iter<I: IntoIterator<Item = (ResourceCost, ResourceCost)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (old, new) in iter {
            mapping.insert(old, new);
        }
        mapping
    }
}

impl From<BudgetMapping> for Vec<BudgetChange> {
    fn from(mapping: BudgetMapping) -> Self {
        mapping
            .entries
            .into_iter()
            .map(|(old, new)| BudgetChange { old, new })
            .collect()
    }
}

impl From<Vec<BudgetChange>> for BudgetMapping {
    fn from(changes: Vec<BudgetChange>) -> Self {
        changes.into_iter().map(|c| (c.old, c.new)).collect()
    }
}

/// A failed scalar (non-paired) assertion anchored to a source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeMismatch {
    /// Value currently written in the test source.
    pub expected: u64,
    /// Value observed by the test run.
    pub actual: u64,
    /// Base name of the source file, as printed by the test framework.
    pub file_name: String,
    /// 1-based line number.
    pub line: usize,
}
