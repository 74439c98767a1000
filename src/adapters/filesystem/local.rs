//! Local file system source tree.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Config;
use crate::domain::ports::SourceTree;

/// Test sources under a fixed set of directories of a project checkout.
#[derive(Debug, Clone)]
pub struct LocalSourceTree {
    root: PathBuf,
    test_dirs: Vec<PathBuf>,
    extension: String,
}

impl LocalSourceTree {
    /// `test_dirs` are relative to `root`; missing ones are skipped.
    pub fn new(root: impl Into<PathBuf>, test_dirs: Vec<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            test_dirs,
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.project_root.clone(),
            config.test_dirs.clone(),
            config.source_extension.clone(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension)
    }
}

#[async_trait]
impl SourceTree for LocalSourceTree {
    async fn list_sources(&self) -> DomainResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for dir in &self.test_dirs {
            let absolute = self.root.join(dir);
            if !absolute.is_dir() {
                debug!(dir = %absolute.display(), "test directory missing, skipping");
                continue;
            }

            for entry in WalkDir::new(&absolute) {
                let entry = entry.map_err(|e| DomainError::SourceDiscovery {
                    path: absolute.clone(),
                    reason: e.to_string(),
                })?;
                if !entry.file_type().is_file() || !self.has_extension(entry.path()) {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(&self.root)
                    .unwrap_or_else(|_| entry.path())
                    .to_path_buf();
                files.push(relative);
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    async fn read(&self, path: &Path) -> DomainResult<String> {
        fs::read_to_string(self.root.join(path))
            .await
            .map_err(|e| DomainError::FileRead {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    async fn write(&self, path: &Path, content: &str) -> DomainResult<()> {
        fs::write(self.root.join(path), content)
            .await
            .map_err(|e| DomainError::FileWrite {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}
