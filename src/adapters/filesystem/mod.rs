//! Source tree adapter implementations.

pub mod local;
pub mod memory;

pub use local::LocalSourceTree;
pub use memory::InMemorySourceTree;
