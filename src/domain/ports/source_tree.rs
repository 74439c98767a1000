//! Source tree port - interface to the test sources on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Trait for the set of test source files the replacement engine may edit.
///
/// Paths handed out and accepted are relative to the project root.
#[async_trait]
pub trait SourceTree: Send + Sync {
    /// List candidate test source files, sorted and deduplicated.
    async fn list_sources(&self) -> DomainResult<Vec<PathBuf>>;

    /// Read a whole file as text.
    async fn read(&self, path: &Path) -> DomainResult<String>;

    /// Replace a whole file's content.
    async fn write(&self, path: &Path, content: &str) -> DomainResult<()>;
}
