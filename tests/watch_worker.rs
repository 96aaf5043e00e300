// tests/watch_worker.rs

use std::sync::Arc;
use std::time::Duration;

use assetpipe::engine::TaskRunner;
use assetpipe::types::TaskName;
use assetpipe::watch::spawn_registration_worker;
use assetpipe_test_utils::fake_tools::CountingRunner;
use assetpipe_test_utils::{init_tracing, with_timeout};

const DEBOUNCE: Duration = Duration::from_millis(50);

#[tokio::test]
async fn a_burst_of_triggers_runs_the_task_once() {
    init_tracing();
    let runner = CountingRunner::new();
    let (tx, join) = spawn_registration_worker(
        TaskName::Files,
        DEBOUNCE,
        Arc::new(runner.clone()) as Arc<dyn TaskRunner>,
    );

    for _ in 0..5 {
        let _ = tx.try_send(());
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(DEBOUNCE * 4).await;

    assert_eq!(runner.runs(TaskName::Files), 1);

    drop(tx);
    with_timeout(join).await.unwrap();
}

#[tokio::test]
async fn separate_bursts_run_separately() {
    init_tracing();
    let runner = CountingRunner::new();
    let (tx, join) = spawn_registration_worker(
        TaskName::Stylesheets,
        DEBOUNCE,
        Arc::new(runner.clone()) as Arc<dyn TaskRunner>,
    );

    tx.send(()).await.unwrap();
    tokio::time::sleep(DEBOUNCE * 4).await;
    tx.send(()).await.unwrap();
    tokio::time::sleep(DEBOUNCE * 4).await;

    assert_eq!(runner.runs(TaskName::Stylesheets), 2);

    drop(tx);
    with_timeout(join).await.unwrap();
}

#[tokio::test]
async fn triggers_during_a_run_collapse_into_one_follow_up() {
    init_tracing();
    let runner = CountingRunner::with_delay(Duration::from_millis(300));
    let (tx, join) = spawn_registration_worker(
        TaskName::Files,
        DEBOUNCE,
        Arc::new(runner.clone()) as Arc<dyn TaskRunner>,
    );

    tx.send(()).await.unwrap();
    // Wait until the first run is in progress.
    tokio::time::sleep(DEBOUNCE * 2).await;
    assert_eq!(runner.runs(TaskName::Files), 1);

    for _ in 0..10 {
        let _ = tx.try_send(());
    }

    // First run finishes, then exactly one follow-up run happens.
    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(runner.runs(TaskName::Files), 2);

    drop(tx);
    with_timeout(join).await.unwrap();
}
