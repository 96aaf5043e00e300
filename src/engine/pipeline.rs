// src/engine/pipeline.rs

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::classify::Classifier;
use crate::config::ConfigFile;
use crate::engine::cleaner::Cleaner;
use crate::engine::installer::{InstallReport, Installer};
use crate::engine::state::{InstallState, InstallStates};
use crate::engine::stylesheets::{CompileReport, StylesheetEngine};
use crate::errors::Result;
use crate::exec::{BoxFuture, Toolchain};
use crate::types::TaskName;

/// Result of a full `all` run.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub install: InstallReport,
    pub compile: CompileReport,
}

/// Owns the three build steps plus the installer state, and sequences them.
#[derive(Debug, Clone)]
pub struct Pipeline {
    classifier: Arc<Classifier>,
    cleaner: Cleaner,
    installer: Installer,
    stylesheets: StylesheetEngine,
    states: InstallStates,
}

impl Pipeline {
    /// Build a pipeline with the given stylesheet tools.
    pub fn new(cfg: &ConfigFile, toolchain: Toolchain) -> Result<Self> {
        let classifier = Arc::new(Classifier::from_config(cfg)?);
        Ok(Self {
            cleaner: Cleaner::new(cfg.paths.build.clone()),
            installer: Installer::from_config(cfg, Arc::clone(&classifier)),
            stylesheets: StylesheetEngine::from_config(cfg, Arc::clone(&classifier), toolchain),
            classifier,
            states: InstallStates::new(),
        })
    }

    /// Build a pipeline that runs the commands configured in `[stylesheets]`.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        Self::new(cfg, Toolchain::from_config(cfg))
    }

    pub fn classifier(&self) -> &Arc<Classifier> {
        &self.classifier
    }

    pub fn stylesheets(&self) -> &StylesheetEngine {
        &self.stylesheets
    }

    /// `clean`: remove the build tree.
    pub async fn clean(&self) -> Result<()> {
        self.cleaner.run().await
    }

    /// `files`: incremental static copy.
    ///
    /// The installer state is only replaced when the pass succeeds.
    pub async fn install(&self) -> Result<InstallReport> {
        let slot = self.states.slot(TaskName::Files);
        let mut state = slot.lock().await;

        let (report, next) = self.installer.run(&state).await?;
        *state = next;
        Ok(report)
    }

    /// `stylesheets`: compile everything; per-file failures are in the report.
    pub async fn compile(&self) -> Result<CompileReport> {
        self.stylesheets.run().await
    }

    /// `all`: clean, install from scratch, compile. Strictly sequential.
    ///
    /// The installer lock is held across clean + install so no other install
    /// can interleave with a half-deleted build tree.
    pub async fn run_all(&self) -> Result<PipelineReport> {
        let install = {
            let slot = self.states.slot(TaskName::Files);
            let mut state = slot.lock().await;

            info!(task = %TaskName::Clean, "running");
            self.clean().await?;

            // The tree is gone; nothing from the previous state is valid.
            *state = InstallState::fresh();

            info!(task = %TaskName::Files, "running");
            let (report, next) = self.installer.run(&state).await?;
            *state = next;
            report
        };

        info!(task = %TaskName::Stylesheets, "running");
        let compile = self.compile().await?;

        Ok(PipelineReport { install, compile })
    }
}

/// Something the watch coordinator can hand a task to.
pub trait TaskRunner: Send + Sync {
    /// Run `task` to completion, logging (not returning) its outcome.
    fn run_task(&self, task: TaskName) -> BoxFuture<'_, ()>;
}

impl TaskRunner for Pipeline {
    fn run_task(&self, task: TaskName) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            match task {
                TaskName::Files => match self.install().await {
                    Ok(report) => info!(
                        task = %task,
                        copied = report.copied,
                        "watch-triggered install finished"
                    ),
                    Err(err) => error!(task = %task, error = %err, "watch-triggered install failed"),
                },
                TaskName::Stylesheets => match self.compile().await {
                    Ok(report) if report.is_clean() => info!(
                        task = %task,
                        written = report.written,
                        "watch-triggered compile finished"
                    ),
                    Ok(report) => warn!(
                        task = %task,
                        written = report.written,
                        failures = report.failures.len(),
                        "watch-triggered compile finished with errors"
                    ),
                    Err(err) => error!(task = %task, error = %err, "watch-triggered compile failed"),
                },
                other => warn!(task = %other, "task cannot be triggered by the watcher"),
            }
        })
    }
}
