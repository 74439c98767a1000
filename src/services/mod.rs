//! Core reconciliation services.
//!
//! Pure text transformations and derivations; the only I/O goes through the
//! `SourceTree` port in the replacement engine.

pub mod failure_parser;
pub mod numeric_codec;
pub mod replacement_engine;
pub mod statistics;
pub mod test_scope;

pub use failure_parser::{failing_tests, FailedAssertion, FailureParser, ParsedFailures};
pub use numeric_codec::{format_cost, format_literal, parse_literal};
pub use replacement_engine::ReplacementEngine;
pub use statistics::{BudgetDelta, BudgetStatistics, PercentRange, SizeDelta};
pub use test_scope::{ScopedRun, TestScopeRouter};
