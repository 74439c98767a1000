//! Color mapping for budget deltas.
//!
//! Coloring is disabled automatically by `console` when stdout is not a
//! terminal or `NO_COLOR` is set.

use console::StyledObject;

/// Signed percentage with the given precision, e.g. `+1.25%`.
pub fn format_percent(value: f64, precision: usize) -> String {
    format!("{value:+.precision$}%")
}

/// Green for decreases, red for increases, dim for no change.
pub fn colorize_percent(value: f64, precision: usize) -> StyledObject<String> {
    let text = format_percent(value, precision);
    if value < 0.0 {
        console::style(text).green()
    } else if value > 0.0 {
        console::style(text).red()
    } else {
        console::style(text).dim()
    }
}
