// tests/watch_end_to_end.rs

use std::sync::Arc;
use std::time::Duration;

use assetpipe::classify::Classifier;
use assetpipe::engine::TaskRunner;
use assetpipe::types::TaskName;
use assetpipe::watch::WatchCoordinator;
use assetpipe_test_utils::builders::Project;
use assetpipe_test_utils::fake_tools::CountingRunner;
use assetpipe_test_utils::init_tracing;

async fn wait_for(runner: &CountingRunner, task: TaskName, at_least: usize) -> bool {
    for _ in 0..100 {
        if runner.runs(task) >= at_least {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn source_changes_reach_the_right_tasks() {
    init_tracing();
    let project = Project::new();
    project.write_src("index.html", "<p>v1</p>");
    project.write_src("img/old.svg", "<svg/>");
    project.write_src("css/site.scss", "a {}");
    let cfg = project.config_with(|raw| raw.watch.debounce_ms = 50);
    let classifier = Classifier::from_config(&cfg).unwrap();
    let coordinator = WatchCoordinator::from_config(&cfg, &classifier).unwrap();

    let runner = CountingRunner::new();
    let task = tokio::spawn(coordinator.run(Arc::new(runner.clone()) as Arc<dyn TaskRunner>));

    // Give the watcher a moment to register.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(runner.runs(TaskName::Files), 0);

    project.write_src("img/logo.svg", "<svg/>");
    assert!(wait_for(&runner, TaskName::Files, 1).await);
    assert_eq!(runner.runs(TaskName::Stylesheets), 0);

    project.write_src("css/_vars.scss", "$a: 1;");
    assert!(wait_for(&runner, TaskName::Stylesheets, 1).await);

    // Excluded files are ignored, and the build tree is never cleaned.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let files_before = runner.runs(TaskName::Files);
    project.write_src("cache.pyc", "x");
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(runner.runs(TaskName::Files), files_before);
    assert_eq!(runner.runs(TaskName::Clean), 0);

    task.abort();
}
