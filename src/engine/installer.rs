// src/engine/installer.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::anyhow;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::classify::{Classifier, SourceFile};
use crate::config::ConfigFile;
use crate::engine::state::InstallState;
use crate::errors::{PipelineError, Result};
use crate::fs::{copy_file, floor_to, modified_since, output_path};

/// Outcome of one successful copy pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Static files found under the source root.
    pub considered: usize,
    /// Files copied in this pass.
    pub copied: usize,
    /// Files skipped because they were not modified since the last pass.
    pub unchanged: usize,
}

/// Incremental copier for the static set.
#[derive(Debug, Clone)]
pub struct Installer {
    src: PathBuf,
    build: PathBuf,
    classifier: Arc<Classifier>,
    max_parallel: usize,
    mtime_resolution: Duration,
}

impl Installer {
    pub fn new(
        src: impl Into<PathBuf>,
        build: impl Into<PathBuf>,
        classifier: Arc<Classifier>,
        max_parallel: usize,
    ) -> Self {
        Self {
            src: src.into(),
            build: build.into(),
            classifier,
            max_parallel: max_parallel.max(1),
            mtime_resolution: Duration::ZERO,
        }
    }

    /// Treat source mtimes as only accurate to `resolution`.
    pub fn with_mtime_resolution(mut self, resolution: Duration) -> Self {
        self.mtime_resolution = resolution;
        self
    }

    pub fn from_config(cfg: &ConfigFile, classifier: Arc<Classifier>) -> Self {
        Self::new(
            cfg.paths.src.clone(),
            cfg.paths.build.clone(),
            classifier,
            cfg.files.max_parallel_copies,
        )
        .with_mtime_resolution(Duration::from_millis(cfg.files.mtime_resolution_ms))
    }

    /// Copy every static file modified after `state`, returning the state the
    /// next pass should start from.
    ///
    /// The returned state is stamped with the time this pass *started*,
    /// rounded down to the mtime resolution. On error nothing is returned, so
    /// the caller keeps the old state and the whole window is retried next
    /// time.
    pub async fn run(&self, state: &InstallState) -> Result<(InstallReport, InstallState)> {
        let started = floor_to(SystemTime::now(), self.mtime_resolution);
        let tree = self.classifier.scan(&self.src)?;

        let mut report = InstallReport {
            considered: tree.statics.len(),
            ..InstallReport::default()
        };

        let mut pending: Vec<SourceFile> = Vec::with_capacity(tree.statics.len());
        for file in tree.statics {
            if modified_since(&file.path, state.last_run(), self.mtime_resolution).await? {
                pending.push(file);
            } else {
                report.unchanged += 1;
            }
        }

        debug!(
            considered = report.considered,
            pending = pending.len(),
            since = ?state.last_run(),
            "static files selected for copy"
        );

        report.copied = self.copy_all(pending).await?;

        info!(
            copied = report.copied,
            unchanged = report.unchanged,
            "static files installed"
        );

        Ok((report, InstallState::completed_at(started)))
    }

    /// Copy files with bounded concurrency; the first failure aborts the
    /// rest of the batch.
    async fn copy_all(&self, files: Vec<SourceFile>) -> Result<usize> {
        let permits = Arc::new(Semaphore::new(self.max_parallel));
        let mut set: JoinSet<Result<()>> = JoinSet::new();

        for file in files {
            let permit = Arc::clone(&permits)
                .acquire_owned()
                .await
                .map_err(|e| PipelineError::Other(anyhow!(e)))?;
            let to = output_path(&self.build, &file.rel_path, None);

            // Surface failures from already-finished copies before queueing more.
            while let Some(done) = set.try_join_next() {
                flatten(done).inspect_err(|_| set.abort_all())?;
            }

            set.spawn(async move {
                let _permit = permit;
                copy_file(&file.path, &to).await?;
                debug!(file = %file.rel, "copied");
                Ok(())
            });
        }

        let mut copied = 0;
        while let Some(done) = set.join_next().await {
            if let Err(err) = flatten(done) {
                warn!(error = %err, "copy failed, aborting remaining copies");
                set.abort_all();
                return Err(err);
            }
            copied += 1;
        }

        Ok(copied)
    }
}

fn flatten(joined: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    joined.map_err(|e| PipelineError::Other(anyhow!(e)))?
}
