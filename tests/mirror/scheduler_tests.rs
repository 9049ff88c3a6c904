// Tests for the scheduler loop and single-pass mode

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use treemirror::sync::{
    MirrorEngine, PassError, RecordingSink, Scheduler, SchedulerState, StopReason,
};

use crate::support::Fixture;

fn scheduler(engine: MirrorEngine) -> Scheduler {
    Scheduler::new(engine, Duration::from_secs(3600), Duration::from_secs(7200))
}

#[tokio::test]
async fn test_run_once_mirrors_tree() {
    let fx = Fixture::new();
    fx.write_source("a.txt", "a");
    fx.write_source("sub/b.txt", "b");

    let sink = Arc::new(RecordingSink::new());
    let engine = MirrorEngine::new(&fx.source, &fx.replica).with_sink(sink.clone());
    let mut scheduler = scheduler(engine);

    let stats = scheduler.run_once().await.unwrap();

    assert_eq!(stats.files_created, 2);
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    assert_eq!(fs::read_to_string(fx.replica.join("sub/b.txt")).unwrap(), "b");
}

#[tokio::test]
async fn test_run_once_reports_missing_root() {
    let fx = Fixture::new();
    let missing = fx.source.join("gone");

    let mut scheduler = scheduler(MirrorEngine::new(&missing, &fx.replica));
    let err = scheduler.run_once().await.unwrap_err();

    assert!(matches!(err, PassError::SourceMissing { ref path } if *path == missing));
    assert!(!fx.replica.exists());
}

#[tokio::test]
async fn test_run_stops_before_first_pass_when_already_shut_down() {
    let fx = Fixture::new();
    fx.write_source("a.txt", "a");

    let (tx, rx) = watch::channel(true);
    let sink = Arc::new(RecordingSink::new());
    let engine = MirrorEngine::new(&fx.source, &fx.replica).with_sink(sink.clone());

    let reason = tokio::time::timeout(Duration::from_secs(5), scheduler(engine).run(rx))
        .await
        .unwrap();

    drop(tx);
    assert_eq!(reason, StopReason::Interrupted);
    assert!(sink.events().is_empty());
    assert!(!fx.replica.exists());
}

#[tokio::test]
async fn test_shutdown_interrupts_sleep() {
    let fx = Fixture::new();
    fx.write_source("a.txt", "a");

    let (tx, rx) = watch::channel(false);
    let engine = MirrorEngine::new(&fx.source, &fx.replica);
    let handle = tokio::spawn(scheduler(engine).run(rx));

    // wait for the first pass to land, then stop during the hour-long sleep
    let copied = fx.replica.join("a.txt");
    for _ in 0..200 {
        if copied.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(copied.exists());

    tx.send(true).unwrap();
    let reason = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reason, StopReason::Interrupted);
}

#[tokio::test]
async fn test_dropped_sender_stops_the_loop() {
    let fx = Fixture::new();
    let (tx, rx) = watch::channel(false);
    drop(tx);

    // source root is missing, so the pass fails and the loop backs off
    let engine = MirrorEngine::new(fx.source.join("gone"), &fx.replica);
    let reason = tokio::time::timeout(Duration::from_secs(5), scheduler(engine).run(rx))
        .await
        .unwrap();

    // a lost sender is not mistaken for a user interrupt
    assert_eq!(reason, StopReason::SignalLost);
}
