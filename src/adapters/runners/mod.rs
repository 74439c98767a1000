//! Test runner adapter implementations.

pub mod command;
pub mod mock;

pub use command::{CommandRunnerConfig, CommandTestRunner};
pub use mock::MockTestRunner;
