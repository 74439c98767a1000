//! In-memory source tree for testing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::SourceTree;

/// Source tree held in memory; counts writes so tests can assert that
/// unchanged files are never rewritten.
#[derive(Debug, Default)]
pub struct InMemorySourceTree {
    files: RwLock<BTreeMap<PathBuf, String>>,
    writes: AtomicUsize,
}

impl InMemorySourceTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_files<I, P, S>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: Into<String>,
    {
        Self {
            files: RwLock::new(
                files
                    .into_iter()
                    .map(|(path, content)| (path.into(), content.into()))
                    .collect(),
            ),
            writes: AtomicUsize::new(0),
        }
    }

    /// Current content of `path`.
    pub async fn content(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.read().await.get(path.as_ref()).cloned()
    }

    /// Number of successful `write` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceTree for InMemorySourceTree {
    async fn list_sources(&self) -> DomainResult<Vec<PathBuf>> {
        Ok(self.files.read().await.keys().cloned().collect())
    }

    async fn read(&self, path: &Path) -> DomainResult<String> {
        self.content(path).await.ok_or_else(|| DomainError::FileRead {
            path: path.to_path_buf(),
            reason: "no such file".to_string(),
        })
    }

    async fn write(&self, path: &Path, content: &str) -> DomainResult<()> {
        self.files
            .write()
            .await
            .insert(path.to_path_buf(), content.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
