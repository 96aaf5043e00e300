// src/engine/stylesheets.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::classify::{Classifier, SourceFile};
use crate::config::ConfigFile;
use crate::errors::{PipelineError, Result};
use crate::exec::Toolchain;
use crate::fs::{output_path, write_file};

/// Which step of a stylesheet's processing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylesheetStage {
    Compile,
    Write,
    Transform,
}

/// A per-file failure. Never aborts the batch.
#[derive(Debug)]
pub struct StylesheetFailure {
    /// Source path relative to the source root.
    pub file: String,
    pub stage: StylesheetStage,
    pub error: PipelineError,
}

/// Outcome of one stylesheet pass.
#[derive(Debug, Default)]
pub struct CompileReport {
    /// Stylesheets whose raw compiled output reached the build tree.
    pub written: usize,
    /// Of those, how many also went through the whole transform chain.
    pub transformed: usize,
    /// Partials (`_name.scss`) that were not compiled on their own.
    pub partials: usize,
    /// Sorted by `file`.
    pub failures: Vec<StylesheetFailure>,
}

impl CompileReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

enum FileOutcome {
    Done,
    Failed(StylesheetFailure),
    /// Raw output is on disk but a transform failed.
    Untransformed(StylesheetFailure),
}

#[derive(Debug)]
struct Inner {
    src: PathBuf,
    build: PathBuf,
    classifier: Arc<Classifier>,
    toolchain: Toolchain,
    include_paths: Vec<PathBuf>,
    output_extension: String,
    max_parallel: usize,
}

/// Compiles the stylesheet set: compile, write raw output, then transform
/// that output in place.
#[derive(Debug, Clone)]
pub struct StylesheetEngine {
    inner: Arc<Inner>,
}

impl StylesheetEngine {
    pub fn from_config(
        cfg: &ConfigFile,
        classifier: Arc<Classifier>,
        toolchain: Toolchain,
    ) -> Self {
        // Imports resolve against the source root first.
        let mut include_paths = vec![cfg.paths.src.clone()];
        include_paths.extend(cfg.stylesheets.include_paths.iter().cloned());

        Self {
            inner: Arc::new(Inner {
                src: cfg.paths.src.clone(),
                build: cfg.paths.build.clone(),
                classifier,
                toolchain,
                include_paths,
                output_extension: cfg.stylesheets.output_extension.clone(),
                max_parallel: cfg.stylesheets.max_parallel_compiles.max(1),
            }),
        }
    }

    /// Where the compiled form of `rel` ends up.
    pub fn output_for(&self, rel: &Path) -> PathBuf {
        output_path(&self.inner.build, rel, Some(&self.inner.output_extension))
    }

    /// Compile every stylesheet.
    ///
    /// Only scanning the source tree can fail as a whole; every per-file
    /// problem lands in [`CompileReport::failures`] and is logged.
    pub async fn run(&self) -> Result<CompileReport> {
        let tree = self.inner.classifier.scan(&self.inner.src)?;
        let mut report = CompileReport::default();

        let permits = Arc::new(Semaphore::new(self.inner.max_parallel));
        let mut set: JoinSet<FileOutcome> = JoinSet::new();

        for file in tree.stylesheets {
            if is_partial(&file.rel) {
                debug!(file = %file.rel, "skipping partial");
                report.partials += 1;
                continue;
            }

            let permit = Arc::clone(&permits)
                .acquire_owned()
                .await
                .map_err(|e| PipelineError::Other(anyhow!(e)))?;
            let inner = Arc::clone(&self.inner);
            set.spawn(async move {
                let _permit = permit;
                process_one(&inner, file).await
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined.map_err(|e| PipelineError::Other(anyhow!(e)))? {
                FileOutcome::Done => {
                    report.written += 1;
                    report.transformed += 1;
                }
                FileOutcome::Untransformed(failure) => {
                    report.written += 1;
                    report.failures.push(failure);
                }
                FileOutcome::Failed(failure) => report.failures.push(failure),
            }
        }

        report.failures.sort_by(|a, b| a.file.cmp(&b.file));

        info!(
            written = report.written,
            transformed = report.transformed,
            failures = report.failures.len(),
            "stylesheets compiled"
        );

        Ok(report)
    }
}

async fn process_one(inner: &Inner, file: SourceFile) -> FileOutcome {
    let out = output_path(&inner.build, &file.rel_path, Some(&inner.output_extension));

    let fail = |stage, error: PipelineError| {
        error!(file = %file.rel, ?stage, error = %error, "stylesheet failed");
        StylesheetFailure {
            file: file.rel.clone(),
            stage,
            error,
        }
    };

    // Pass 1: raw compiler output.
    let css = match inner
        .toolchain
        .compiler
        .compile(&file.path, &inner.include_paths)
        .await
    {
        Ok(css) => css,
        Err(err) => return FileOutcome::Failed(fail(StylesheetStage::Compile, err)),
    };
    if let Err(err) = write_file(&out, &css).await {
        return FileOutcome::Failed(fail(StylesheetStage::Write, err));
    }
    debug!(file = %file.rel, output = ?out, "raw css written");

    // Pass 2: read back what was written and transform it in place.
    let mut css = match tokio::fs::read_to_string(&out).await {
        Ok(css) => css,
        Err(err) => return FileOutcome::Untransformed(fail(StylesheetStage::Write, err.into())),
    };
    for step in &inner.toolchain.transforms {
        css = match step.apply(css, &out).await {
            Ok(next) => next,
            Err(err) => {
                return FileOutcome::Untransformed(fail(StylesheetStage::Transform, err));
            }
        };
    }
    if let Err(err) = write_file(&out, &css).await {
        return FileOutcome::Untransformed(fail(StylesheetStage::Write, err));
    }

    debug!(file = %file.rel, output = ?out, "stylesheet done");
    FileOutcome::Done
}

/// `_name.scss` files are import-only.
fn is_partial(rel: &str) -> bool {
    Path::new(rel)
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partials_are_detected_by_file_name() {
        assert!(is_partial("_vars.scss"));
        assert!(is_partial("css/_mixins.scss"));
        assert!(!is_partial("css/site.scss"));
        assert!(!is_partial("_dir/site.scss"));
    }
}
