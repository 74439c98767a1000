//! Port trait definitions (Hexagonal Architecture)
//!
//! The reconciliation core talks to the outside world through two ports:
//! - TestRunner: runs the external test suite and returns its raw output
//! - SourceTree: enumerates, reads and writes test source files

pub mod source_tree;
pub mod test_runner;

pub use source_tree::SourceTree;
pub use test_runner::TestRunner;
