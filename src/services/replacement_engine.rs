//! Replacement engine: rewrites budget literals in test sources.
//!
//! Paired costs are rewritten wherever a parsed literal equals a mapping key.
//! Scalar sizes are rewritten only on the line the failure pointed at, plus
//! the `size is N` phrase used in test names.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{BudgetMapping, ResourceCost, SizeMismatch};
use crate::domain::ports::SourceTree;
use crate::services::numeric_codec::{format_cost, parse_literal};

/// Rewrites resource-cost and size literals in source text.
#[derive(Debug, Clone)]
pub struct ReplacementEngine {
    literal_name: String,
    cost_literal: Regex,
}

impl ReplacementEngine {
    pub fn new(literal_name: &str) -> DomainResult<Self> {
        let name = regex::escape(literal_name);
        let cost_literal = Regex::new(&format!(
            r"{name}\(\s*(?:memory\s*=\s*)?([0-9][0-9_]*L?)\s*,\s*(?:steps\s*=\s*)?([0-9][0-9_]*L?)\s*\)"
        ))
        .map_err(|e| DomainError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            literal_name: literal_name.to_string(),
            cost_literal,
        })
    }

    /// Rewrite every cost literal whose parsed value is a key of `mapping`.
    ///
    /// Literals that are not keys are copied through untouched, whatever
    /// their spelling.
    pub fn rewrite_budgets(&self, content: &str, mapping: &BudgetMapping) -> DomainResult<String> {
        if mapping.is_empty() {
            return Ok(content.to_string());
        }

        let mut out = String::with_capacity(content.len());
        let mut last = 0;
        for caps in self.cost_literal.captures_iter(content) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let old = ResourceCost::new(parse_literal(&caps[1])?, parse_literal(&caps[2])?);
            if let Some(new) = mapping.get(&old) {
                out.push_str(&content[last..whole.start()]);
                out.push_str(&format_cost(&self.literal_name, *new));
                last = whole.end();
            }
        }
        out.push_str(&content[last..]);
        Ok(out)
    }

    /// Apply the size mismatches that name `file_name` to `content`.
    pub fn rewrite_sizes(content: &str, file_name: &str, sizes: &[SizeMismatch]) -> String {
        let relevant: Vec<&SizeMismatch> =
            sizes.iter().filter(|m| m.file_name == file_name).collect();
        if relevant.is_empty() {
            return content.to_string();
        }

        let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
        for mismatch in &relevant {
            let Some(line) = mismatch.line.checked_sub(1).and_then(|idx| lines.get_mut(idx))
            else {
                debug!(
                    file = file_name,
                    line = mismatch.line,
                    "size mismatch points past end of file"
                );
                continue;
            };
            *line = replace_isolated(
                line,
                &mismatch.expected.to_string(),
                &mismatch.actual.to_string(),
                true,
            );
        }

        let mut out = lines.join("\n");
        for mismatch in &relevant {
            out = replace_isolated(
                &out,
                &format!("size is {}", mismatch.expected),
                &format!("size is {}", mismatch.actual),
                false,
            );
        }
        out
    }

    /// Both rewrites for one file.
    ///
    /// Sizes go first: reported line numbers refer to the unpatched text, and
    /// a multi-line cost literal collapses to one line when rewritten.
    pub fn rewrite(
        &self,
        path: &Path,
        content: &str,
        mapping: &BudgetMapping,
        sizes: &[SizeMismatch],
    ) -> DomainResult<String> {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let patched = Self::rewrite_sizes(content, file_name, sizes);
        self.rewrite_budgets(&patched, mapping)
    }

    /// Patch every source in `tree`, writing only files whose content
    /// changed. Returns the changed paths.
    pub async fn apply(
        &self,
        tree: &dyn SourceTree,
        mapping: &BudgetMapping,
        sizes: &[SizeMismatch],
    ) -> DomainResult<BTreeSet<PathBuf>> {
        self.patch_tree(tree, mapping, sizes, true).await
    }

    /// Same as [`apply`](Self::apply) without writing anything.
    pub async fn preview(
        &self,
        tree: &dyn SourceTree,
        mapping: &BudgetMapping,
        sizes: &[SizeMismatch],
    ) -> DomainResult<BTreeSet<PathBuf>> {
        self.patch_tree(tree, mapping, sizes, false).await
    }

    async fn patch_tree(
        &self,
        tree: &dyn SourceTree,
        mapping: &BudgetMapping,
        sizes: &[SizeMismatch],
        write: bool,
    ) -> DomainResult<BTreeSet<PathBuf>> {
        let mut changed = BTreeSet::new();
        if mapping.is_empty() && sizes.is_empty() {
            return Ok(changed);
        }

        for path in tree.list_sources().await? {
            let content = tree.read(&path).await?;
            let patched = self.rewrite(&path, &content, mapping, sizes)?;
            if patched == content {
                continue;
            }
            if write {
                tree.write(&path, &patched).await?;
                info!(file = %path.display(), "updated test source");
            }
            changed.insert(path);
        }

        Ok(changed)
    }
}

/// Replace occurrences of `needle` that are not glued to further digits.
///
/// The right edge is always checked; the left edge only when `check_left`.
fn replace_isolated(haystack: &str, needle: &str, replacement: &str, check_left: bool) -> String {
    let bytes = haystack.as_bytes();
    let is_digitish = |b: u8| b.is_ascii_digit() || b == b'_';

    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for (start, _) in haystack.match_indices(needle) {
        let end = start + needle.len();
        let left_ok = !check_left || start == 0 || !is_digitish(bytes[start - 1]);
        let right_ok = end == bytes.len() || !is_digitish(bytes[end]);
        if left_ok && right_ok {
            out.push_str(&haystack[last..start]);
            out.push_str(replacement);
            last = end;
        }
    }
    out.push_str(&haystack[last..]);
    out
}
