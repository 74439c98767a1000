//! Adapters for the external collaborators: the test runner process and the
//! file system holding test sources.

pub mod filesystem;
pub mod runners;
