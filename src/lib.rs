// src/lib.rs

pub mod classify;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, ConfigOverrides, load_with_overrides};
use crate::engine::{CompileReport, Pipeline, TaskRunner};
use crate::types::TaskName;
use crate::watch::WatchCoordinator;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (+ CLI overrides)
/// - the build pipeline and its external tools
/// - (for `watch`) the file watcher and Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let overrides = ConfigOverrides {
        src: args.src.clone(),
        build: args.build.clone(),
    };
    let cfg = load_with_overrides(args.config.as_deref(), &overrides)?;
    let pipeline = Arc::new(Pipeline::from_config(&cfg)?);

    if args.dry_run {
        print_dry_run(&cfg, &pipeline, args.task)?;
        return Ok(());
    }

    run_task(args.task, &cfg, pipeline).await
}

/// Run one named task against an already-built pipeline.
///
/// Fatal errors (clean / copy / config) are returned; stylesheet per-file
/// failures are only logged.
pub async fn run_task(task: TaskName, cfg: &ConfigFile, pipeline: Arc<Pipeline>) -> Result<()> {
    info!(task = %task, src = ?cfg.paths.src, build = ?cfg.paths.build, "starting task");

    match task {
        TaskName::Clean => pipeline.clean().await?,
        TaskName::Files => {
            let report = pipeline.install().await?;
            info!(copied = report.copied, unchanged = report.unchanged, "files done");
        }
        TaskName::Stylesheets => {
            let report = pipeline.compile().await?;
            log_compile_report(&report);
        }
        TaskName::All => {
            let report = pipeline.run_all().await?;
            info!(copied = report.install.copied, "files done");
            log_compile_report(&report.compile);
        }
        TaskName::Watch => {
            let coordinator = WatchCoordinator::from_config(cfg, pipeline.classifier())?;
            let runner: Arc<dyn TaskRunner> = pipeline;

            // No cancellation API: the coordinator runs until Ctrl-C ends
            // the process.
            tokio::select! {
                res = coordinator.run(runner) => res?,
                res = tokio::signal::ctrl_c() => {
                    res?;
                    info!("shutdown requested, stopping watch");
                }
            }
        }
    }

    Ok(())
}

fn log_compile_report(report: &CompileReport) {
    if report.is_clean() {
        info!(
            written = report.written,
            partials = report.partials,
            "stylesheets done"
        );
        return;
    }

    for failure in &report.failures {
        warn!(file = %failure.file, stage = ?failure.stage, error = %failure.error, "stylesheet not built");
    }
    warn!(
        written = report.written,
        failures = report.failures.len(),
        "stylesheets done with errors"
    );
}

/// Print what each task would touch, without running anything.
fn print_dry_run(cfg: &ConfigFile, pipeline: &Pipeline, task: TaskName) -> Result<()> {
    let tree = pipeline.classifier().scan(&cfg.paths.src)?;

    println!("assetpipe dry-run ({task})");
    println!("  src   = {}", cfg.paths.src.display());
    println!("  build = {}", cfg.paths.build.display());
    println!("  compiler   = {:?}", cfg.stylesheets.compiler);
    println!("  transforms = {:?}", cfg.stylesheets.transforms);
    println!();

    println!("static files ({}):", tree.statics.len());
    for file in &tree.statics {
        println!("  - {}", file.rel);
    }

    println!("stylesheets ({}):", tree.stylesheets.len());
    for file in &tree.stylesheets {
        let output = pipeline.stylesheets().output_for(&file.rel_path);
        println!("  - {} -> {}", file.rel, output.display());
    }

    if !tree.excluded.is_empty() {
        println!("excluded ({}):", tree.excluded.len());
        for file in &tree.excluded {
            println!("  - {}", file.rel);
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
