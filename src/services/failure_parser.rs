//! Failure parser: turns raw, possibly ANSI-coloured test output into budget
//! mismatches and failing test identifiers.
//!
//! Three assertion phrasings are recognised:
//!
//! | Family  | Text                                                        |
//! |---------|-------------------------------------------------------------|
//! | budget  | `expected: ExUnits(a,b), ... but got: ExUnits(c,d);`        |
//! | budget  | `ExUnits(c, d) did not equal ExUnits(a, b)`                 |
//! | scalar  | `83 did not equal 123 (ExprSizeAndBudgetTest.scala:74)`     |
//!
//! Budget families always map expected -> actual, whatever order the text
//! prints them in.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{BudgetMapping, ResourceCost, SizeMismatch};

static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]|\[0J").expect("valid ANSI pattern"));

static LOG_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?:error|warn|info)\]\s*").expect("valid log tag pattern")
});

static TEST_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][\w.]*[A-Z]\w*$").expect("valid identifier pattern"));

const FAILED_TESTS_HEADER: &str = "Failed tests:";

/// Remove terminal escape sequences.
pub fn strip_ansi(text: &str) -> String {
    ANSI_RE.replace_all(text, "").into_owned()
}

/// One recognised failed assertion, tagged by pattern family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailedAssertion {
    /// A paired resource-cost mismatch (either budget phrasing).
    Budget {
        expected: ResourceCost,
        actual: ResourceCost,
    },
    /// A plain integer mismatch anchored to a file and line.
    Scalar(SizeMismatch),
}

/// Result of parsing one test run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFailures {
    pub budgets: BudgetMapping,
    pub sizes: Vec<SizeMismatch>,
}

impl ParsedFailures {
    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty() && self.sizes.is_empty()
    }
}

/// Parser configured for one literal name and source extension.
#[derive(Debug, Clone)]
pub struct FailureParser {
    expected_but_got: Regex,
    cost_not_equal: Regex,
    scalar_not_equal: Regex,
}

impl FailureParser {
    /// Build a parser for `literal_name(...)` costs and `*.{extension}` anchors.
    pub fn new(literal_name: &str, extension: &str) -> DomainResult<Self> {
        let name = regex::escape(literal_name);
        let ext = regex::escape(extension);
        Ok(Self {
            expected_but_got: compile(&format!(
                r"(?s)expected: {name}\((\d+),(\d+)\),.*?but got: {name}\((\d+),(\d+)\);"
            ))?,
            cost_not_equal: compile(&format!(
                r"{name}\((\d+),\s*(\d+)\) did not equal {name}\((\d+),\s*(\d+)\)"
            ))?,
            scalar_not_equal: compile(&format!(
                r"(\d+) did not equal (\d+) \((\w+\.{ext}):(\d+)\)"
            ))?,
        })
    }

    /// Find every recognised failed assertion in `output`, budget families
    /// first (in text order per family), then scalars.
    pub fn scan(&self, output: &str) -> DomainResult<Vec<FailedAssertion>> {
        let text = strip_ansi(output);
        let mut found = Vec::new();

        for caps in self.expected_but_got.captures_iter(&text) {
            found.push(FailedAssertion::Budget {
                expected: cost_at(&caps, 1)?,
                actual: cost_at(&caps, 3)?,
            });
        }

        // Actual is printed first here.
        for caps in self.cost_not_equal.captures_iter(&text) {
            found.push(FailedAssertion::Budget {
                actual: cost_at(&caps, 1)?,
                expected: cost_at(&caps, 3)?,
            });
        }

        for caps in self.scalar_not_equal.captures_iter(&text) {
            found.push(FailedAssertion::Scalar(SizeMismatch {
                actual: number_at(&caps, 1)?,
                expected: number_at(&caps, 2)?,
                file_name: caps[3].to_string(),
                line: number_at(&caps, 4)?
                    .try_into()
                    .map_err(|_| DomainError::MalformedLiteral(caps[4].to_string()))?,
            }));
        }

        Ok(found)
    }

    /// Parse `output` into a budget mapping and the scalar mismatches that
    /// are not already explained by it.
    pub fn parse(&self, output: &str) -> DomainResult<ParsedFailures> {
        let mut parsed = ParsedFailures::default();
        let mut scalars = Vec::new();

        for assertion in self.scan(output)? {
            match assertion {
                FailedAssertion::Budget { expected, actual } => {
                    parsed.budgets.insert(expected, actual);
                }
                FailedAssertion::Scalar(mismatch) => scalars.push(mismatch),
            }
        }

        parsed.sizes = scalars
            .into_iter()
            .filter(|m| {
                if m.expected == m.actual {
                    return false;
                }
                let forward = ResourceCost::new(m.expected, m.actual);
                let reverse = ResourceCost::new(m.actual, m.expected);
                !(parsed.budgets.mentions(&forward) || parsed.budgets.mentions(&reverse))
            })
            .collect();

        debug!(
            budgets = parsed.budgets.len(),
            sizes = parsed.sizes.len(),
            "parsed test output"
        );
        Ok(parsed)
    }
}

/// Extract failing test identifiers listed under a `Failed tests:` header.
///
/// The block ends at the first line that does not look like a fully
/// qualified class name. Order of first appearance is kept.
pub fn failing_tests(output: &str) -> Vec<String> {
    let text = strip_ansi(output);
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    let mut in_block = false;

    for line in text.lines() {
        let cleaned = LOG_TAG_RE.replace(line, "");
        let cleaned = cleaned.trim();
        if cleaned == FAILED_TESTS_HEADER {
            in_block = true;
            continue;
        }
        if !in_block {
            continue;
        }
        if TEST_ID_RE.is_match(cleaned) {
            if seen.insert(cleaned.to_string()) {
                ids.push(cleaned.to_string());
            }
        } else {
            in_block = false;
        }
    }

    ids
}

fn compile(pattern: &str) -> DomainResult<Regex> {
    Regex::new(pattern).map_err(|e| DomainError::InvalidConfiguration(e.to_string()))
}

fn number_at(caps: &Captures<'_>, idx: usize) -> DomainResult<u64> {
    let raw = &caps[idx];
    raw.parse()
        .map_err(|_| DomainError::MalformedLiteral(raw.to_string()))
}

fn cost_at(caps: &Captures<'_>, first: usize) -> DomainResult<ResourceCost> {
    Ok(ResourceCost::new(
        number_at(caps, first)?,
        number_at(caps, first + 1)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> FailureParser {
        FailureParser::new("ExUnits", "scala").unwrap()
    }

    #[test]
    fn test_expected_but_got_across_lines() {
        let output = "\x1b[31m[info] - budget *** FAILED ***\x1b[0m\n\
            [info]   Expected budget mismatch, expected: ExUnits(129528,37067868),\n\
            [info]   some other detail\n\
            [info]   but got: ExUnits(129000,37000000);\n";

        let parsed = parser().parse(output).unwrap();

        assert_eq!(parsed.budgets.len(), 1);
        assert_eq!(
            parsed.budgets.get(&ResourceCost::new(129_528, 37_067_868)),
            Some(&ResourceCost::new(129_000, 37_000_000))
        );
        assert!(parsed.sizes.is_empty());
    }

    #[test]
    fn test_expected_but_got_is_non_greedy() {
        let output = "expected: ExUnits(1,2), x but got: ExUnits(3,4);\n\
                      expected: ExUnits(5,6), y but got: ExUnits(7,8);";

        let parsed = parser().parse(output).unwrap();

        assert_eq!(parsed.budgets.len(), 2);
        assert_eq!(parsed.budgets.get(&ResourceCost::new(1, 2)), Some(&ResourceCost::new(3, 4)));
        assert_eq!(parsed.budgets.get(&ResourceCost::new(5, 6)), Some(&ResourceCost::new(7, 8)));
    }

    #[test]
    fn test_did_not_equal_reverses_operands() {
        let output = "[info]   ExUnits(900, 1800) did not equal ExUnits(1000, 2000) (BudgetTest.scala:12)";

        let parsed = parser().parse(output).unwrap();

        assert_eq!(
            parsed.budgets.get(&ResourceCost::new(1000, 2000)),
            Some(&ResourceCost::new(900, 1800))
        );
        assert!(parsed.sizes.is_empty());
    }

    #[test]
    fn test_later_budget_match_overwrites() {
        let output = "expected: ExUnits(10,20), but got: ExUnits(11,21);\n\
                      ExUnits(12, 22) did not equal ExUnits(10, 20)";

        let parsed = parser().parse(output).unwrap();

        assert_eq!(parsed.budgets.len(), 1);
        assert_eq!(parsed.budgets.get(&ResourceCost::new(10, 20)), Some(&ResourceCost::new(12, 22)));
    }

    #[test]
    fn test_scalar_mismatch() {
        let output = "[info]   83 did not equal 123 (ExprSizeAndBudgetTest.scala:74)";

        let parsed = parser().parse(output).unwrap();

        assert!(parsed.budgets.is_empty());
        assert_eq!(
            parsed.sizes,
            vec![SizeMismatch {
                expected: 123,
                actual: 83,
                file_name: "ExprSizeAndBudgetTest.scala".to_string(),
                line: 74,
            }]
        );
    }

    #[test]
    fn test_scalar_equal_values_are_ignored() {
        let output = "42 did not equal 42 (SizeTest.scala:5)";
        assert!(parser().parse(output).unwrap().sizes.is_empty());
    }

    #[test]
    fn test_scalar_other_extension_is_ignored() {
        let output = "83 did not equal 123 (SizeTest.java:74)";
        assert!(parser().parse(output).unwrap().is_empty());
    }

    #[test]
    fn test_scalar_matching_budget_pair_is_excluded() {
        let output = "expected: ExUnits(100,90), but got: ExUnits(95,85);\n\
                      90 did not equal 100 (BudgetTest.scala:3)\n\
                      100 did not equal 90 (BudgetTest.scala:4)\n\
                      85 did not equal 95 (BudgetTest.scala:5)\n\
                      7 did not equal 9 (BudgetTest.scala:6)";

        let parsed = parser().parse(output).unwrap();

        assert_eq!(parsed.budgets.len(), 1);
        assert_eq!(parsed.sizes.len(), 1);
        assert_eq!(parsed.sizes[0].line, 6);
    }

    #[test]
    fn test_mixed_forms_do_not_cross_contaminate() {
        let output = "expected: ExUnits(5000,600000), details but got: ExUnits(4900,590000);\n\
                      [info] 83 did not equal 123 (ExprSizeAndBudgetTest.scala:74)";

        let parsed = parser().parse(output).unwrap();

        assert_eq!(parsed.budgets.len(), 1);
        assert_eq!(
            parsed.budgets.get(&ResourceCost::new(5000, 600_000)),
            Some(&ResourceCost::new(4900, 590_000))
        );
        assert_eq!(parsed.sizes.len(), 1);
        assert_eq!((parsed.sizes[0].expected, parsed.sizes[0].actual), (123, 83));
    }

    #[test]
    fn test_scan_tags_families() {
        let output = "ExUnits(1, 2) did not equal ExUnits(3, 4)\n5 did not equal 6 (A.scala:1)";

        let found = parser().scan(output).unwrap();

        assert!(matches!(found[0], FailedAssertion::Budget { .. }));
        assert!(matches!(found[1], FailedAssertion::Scalar(_)));
    }

    #[test]
    fn test_custom_literal_name() {
        let parser = FailureParser::new("Budget", "scala").unwrap();
        let output = "Budget(1, 2) did not equal Budget(3, 4)\nExUnits(5, 6) did not equal ExUnits(7, 8)";

        let parsed = parser.parse(output).unwrap();

        assert_eq!(parsed.budgets.len(), 1);
        assert!(parsed.budgets.contains_key(&ResourceCost::new(3, 4)));
    }

    #[test]
    fn test_overflowing_number_is_fatal() {
        let output = "ExUnits(99999999999999999999999, 1) did not equal ExUnits(1, 1)";
        assert!(matches!(
            parser().parse(output),
            Err(DomainError::MalformedLiteral(_))
        ));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[1;31mred\x1b[0m[0J"), "red");
    }

    #[test]
    fn test_failing_tests_block() {
        let output = "[info] Run completed\n\
            \x1b[31m[error]\x1b[0m Failed tests:\n\
            [error] \tscalus.uplc.eval.BudgetTest\n\
            [error] \tscalus.examples.HtlcTest\n\
            [error] \tscalus.uplc.eval.BudgetTest\n\
            [error] (scalusJVM / Test / testOnly) sbt.TestsFailedException\n\
            [error] \tscalus.NotCollected\n";

        assert_eq!(
            failing_tests(output),
            vec![
                "scalus.uplc.eval.BudgetTest".to_string(),
                "scalus.examples.HtlcTest".to_string(),
            ]
        );
    }

    #[test]
    fn test_failing_tests_multiple_blocks() {
        let output = "[error] Failed tests:\n[error] \ta.BTest\n\n\
                      [error] Failed tests:\n[error] \tc.DTest\n[error] \ta.BTest\n";

        assert_eq!(failing_tests(output), vec!["a.BTest".to_string(), "c.DTest".to_string()]);
    }

    #[test]
    fn test_failing_tests_absent() {
        assert!(failing_tests("[info] All tests passed.").is_empty());
    }
}
