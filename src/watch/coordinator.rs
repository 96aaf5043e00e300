// src/watch/coordinator.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::classify::{Classifier, GlobFilter, stylesheet_prerequisite_spec};
use crate::config::ConfigFile;
use crate::engine::TaskRunner;
use crate::errors::Result;
use crate::types::TaskName;
use crate::watch::debounce::Debouncer;
use crate::watch::path_utils::relative_str;
use crate::watch::watcher::spawn_watcher;

/// One watch subscription: a filter over source-relative paths and the task
/// it re-runs.
#[derive(Debug, Clone)]
pub struct Registration {
    task: TaskName,
    filter: GlobFilter,
}

impl Registration {
    pub fn new(task: TaskName, filter: GlobFilter) -> Self {
        Self { task, filter }
    }

    pub fn task(&self) -> TaskName {
        self.task
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.filter.matches(rel_path)
    }
}

/// Watches the source tree and re-runs `stylesheets` / `files` on changes.
///
/// Each registration gets its own worker task, so the two never block each
/// other, while runs of the *same* task are serialized: triggers that arrive
/// during a run collapse into one follow-up run.
#[derive(Debug)]
pub struct WatchCoordinator {
    root: PathBuf,
    registrations: Vec<Registration>,
    debounce: Duration,
}

impl WatchCoordinator {
    pub fn new(root: impl Into<PathBuf>, registrations: Vec<Registration>, debounce: Duration) -> Self {
        Self {
            root: root.into(),
            registrations,
            debounce,
        }
    }

    /// The two standard registrations:
    /// - stylesheets + templates → `stylesheets`
    /// - static set → `files`
    pub fn from_config(cfg: &ConfigFile, classifier: &Classifier) -> Result<Self> {
        let registrations = vec![
            Registration::new(
                TaskName::Stylesheets,
                GlobFilter::new(&stylesheet_prerequisite_spec(cfg))?,
            ),
            Registration::new(TaskName::Files, classifier.static_filter().clone()),
        ];
        Ok(Self::new(
            cfg.paths.src.clone(),
            registrations,
            Duration::from_millis(cfg.watch.debounce_ms),
        ))
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Tasks interested in a change to `rel_path`.
    pub fn route(&self, rel_path: &str) -> Vec<TaskName> {
        self.registrations
            .iter()
            .filter(|r| r.matches(rel_path))
            .map(|r| r.task)
            .collect()
    }

    /// Watch until the process exits (or the watcher goes away).
    pub async fn run(self, runner: Arc<dyn TaskRunner>) -> Result<()> {
        let (paths_tx, mut paths_rx) = mpsc::unbounded_channel::<PathBuf>();
        let handle = spawn_watcher(self.root.clone(), paths_tx)?;
        let root = handle.root().to_path_buf();

        let workers: Vec<(TaskName, mpsc::Sender<()>, JoinHandle<()>)> = self
            .registrations
            .iter()
            .map(|r| {
                let (tx, join) = spawn_registration_worker(r.task, self.debounce, Arc::clone(&runner));
                (r.task, tx, join)
            })
            .collect();

        info!(
            root = ?root,
            registrations = ?self.registrations.iter().map(|r| r.task).collect::<Vec<_>>(),
            "watching for changes"
        );

        while let Some(path) = paths_rx.recv().await {
            let Some(rel) = relative_str(&root, &path) else {
                warn!("could not relativize path {:?} against root {:?}", path, root);
                continue;
            };

            for task in self.route(&rel) {
                let Some((_, tx, _)) = workers.iter().find(|(t, _, _)| *t == task) else {
                    continue;
                };
                debug!(task = %task, path = %rel, "watch match -> triggering task");
                match tx.try_send(()) {
                    Ok(()) => {}
                    // A trigger is already waiting; this one folds into it.
                    Err(TrySendError::Full(())) => {}
                    Err(TrySendError::Closed(())) => {
                        warn!(task = %task, "worker for task is gone");
                    }
                }
            }
        }

        debug!("file watcher loop ended");
        drop(handle);
        for (_, tx, join) in workers {
            drop(tx);
            let _ = join.await;
        }
        Ok(())
    }
}

/// Spawn the worker that owns one registration's debounce state and runs its
/// task. Send `()` on the returned channel to trigger it.
///
/// The channel holds a single trigger, so while the task is running any
/// number of new triggers collapse into exactly one follow-up run.
pub fn spawn_registration_worker(
    task: TaskName,
    debounce: Duration,
    runner: Arc<dyn TaskRunner>,
) -> (mpsc::Sender<()>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<()>(1);

    let join = tokio::spawn(async move {
        let mut debouncer = Debouncer::new(debounce);

        // Idle: wait for the first trigger of a burst.
        while rx.recv().await.is_some() {
            debouncer.on_event(Instant::now());

            // Pending: absorb triggers until the burst goes quiet.
            while let Some(deadline) = debouncer.deadline() {
                tokio::select! {
                    msg = rx.recv() => match msg {
                        Some(()) => debouncer.on_event(Instant::now()),
                        None => return,
                    },
                    _ = tokio::time::sleep_until(deadline.into()) => {
                        debouncer.poll(Instant::now());
                    }
                }
            }

            info!(task = %task, "change detected, running task");
            runner.run_task(task).await;
        }
        debug!(task = %task, "watch worker finished");
    });

    (tx, join)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfigFile;

    fn coordinator() -> WatchCoordinator {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        let classifier = Classifier::from_config(&cfg).unwrap();
        WatchCoordinator::from_config(&cfg, &classifier).unwrap()
    }

    #[test]
    fn stylesheet_changes_only_trigger_stylesheets() {
        assert_eq!(coordinator().route("css/_vars.scss"), vec![TaskName::Stylesheets]);
    }

    #[test]
    fn template_changes_trigger_both_tasks() {
        // Templates are static files and stylesheet prerequisites at once.
        assert_eq!(
            coordinator().route("templates/base.html"),
            vec![TaskName::Stylesheets, TaskName::Files]
        );
    }

    #[test]
    fn static_changes_only_trigger_files() {
        assert_eq!(coordinator().route("img/logo.svg"), vec![TaskName::Files]);
        assert_eq!(coordinator().route(".env"), vec![TaskName::Files]);
    }

    #[test]
    fn excluded_changes_trigger_nothing() {
        assert!(coordinator().route("app/cache.pyc").is_empty());
        assert!(coordinator().route(".gitignore").is_empty());
    }

    #[test]
    fn never_routes_to_clean() {
        let c = coordinator();
        assert!(c.registrations().iter().all(|r| r.task() != TaskName::Clean));
    }
}
