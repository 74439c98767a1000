//! Literal codec for budget numbers.
//!
//! Hand-written budget assertions group the last six digits with an
//! underscore (`37_067868`) and mark values that do not fit a 32-bit signed
//! int with an `L` suffix. Patched literals use the same shape so they match
//! their untouched neighbours.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::ResourceCost;

/// Largest value that is written without the long suffix.
pub const INT_MAX: u64 = 2_147_483_647;

const GROUP_WIDTH: usize = 6;
const GROUP_MARK: char = '_';
const LONG_SUFFIX: char = 'L';

/// Render `n` in grouped-literal form.
pub fn format_literal(n: u64) -> String {
    let digits = n.to_string();
    let mut out = if digits.len() > GROUP_WIDTH {
        let (head, tail) = digits.split_at(digits.len() - GROUP_WIDTH);
        format!("{head}{GROUP_MARK}{tail}")
    } else {
        digits
    };
    if n > INT_MAX {
        out.push(LONG_SUFFIX);
    }
    out
}

/// Parse a literal written by hand or by [`format_literal`].
///
/// Grouping marks may appear anywhere; at most one trailing `L` is accepted.
pub fn parse_literal(literal: &str) -> DomainResult<u64> {
    let body = literal.strip_suffix(LONG_SUFFIX).unwrap_or(literal);
    let digits: String = body.chars().filter(|c| *c != GROUP_MARK).collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::MalformedLiteral(literal.to_string()));
    }
    digits
        .parse()
        .map_err(|_| DomainError::MalformedLiteral(literal.to_string()))
}

/// Render a full resource-cost literal, e.g.
/// `ExUnits(memory = 129_528, steps = 37_067868)`.
pub fn format_cost(literal_name: &str, cost: ResourceCost) -> String {
    format!(
        "{literal_name}(memory = {}, steps = {})",
        format_literal(cost.memory),
        format_literal(cost.steps)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_numbers_are_not_grouped() {
        assert_eq!(format_literal(0), "0");
        assert_eq!(format_literal(83), "83");
        assert_eq!(format_literal(999_999), "999999");
    }

    #[test]
    fn test_seven_digits_get_one_mark() {
        assert_eq!(format_literal(1_000_000), "1_000000");
        assert_eq!(format_literal(37_067_868), "37_067868");
    }

    #[test]
    fn test_long_suffix_boundary() {
        assert_eq!(format_literal(INT_MAX), "2147_483647");
        assert_eq!(format_literal(INT_MAX + 1), "2147_483648L");
    }

    #[test]
    fn test_parse_accepts_any_grouping() {
        assert_eq!(parse_literal("129_528").unwrap(), 129_528);
        assert_eq!(parse_literal("37_067868").unwrap(), 37_067_868);
        assert_eq!(parse_literal("1_000_000").unwrap(), 1_000_000);
        assert_eq!(parse_literal("2147_483648L").unwrap(), 2_147_483_648);
        assert_eq!(parse_literal("42").unwrap(), 42);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "_", "L", "12a", "LL", "99999999999999999999999"] {
            assert!(
                matches!(parse_literal(bad), Err(DomainError::MalformedLiteral(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(
            format_cost("ExUnits", ResourceCost::new(129_000, 37_000_000)),
            "ExUnits(memory = 129000, steps = 37_000000)"
        );
    }
}
