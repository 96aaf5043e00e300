// src/engine/cleaner.rs

use std::path::PathBuf;

use tracing::info;

use crate::errors::Result;
use crate::fs::remove_tree;

/// Deletes the build tree.
#[derive(Debug, Clone)]
pub struct Cleaner {
    build: PathBuf,
}

impl Cleaner {
    pub fn new(build: impl Into<PathBuf>) -> Self {
        Self {
            build: build.into(),
        }
    }

    /// Remove the whole build tree. A missing tree is fine.
    pub async fn run(&self) -> Result<()> {
        let existed = tokio::fs::symlink_metadata(&self.build).await.is_ok();
        remove_tree(&self.build).await?;
        info!(build = ?self.build, existed, "build tree cleaned");
        Ok(())
    }
}
