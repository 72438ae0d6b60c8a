use std::sync::{Arc, Mutex};
use std::time::Duration;

use watcher_fs::engine::{AsyncWatcher, Handler, Payload};
use watcher_fs::errors::WatcherError;
use watcher_fs::types::{Change, DispatchStyle, EventKind, TriggerMode};
use watcher_fs_test_utils::{init_tracing, with_timeout, Recorder, TempTree};

fn txt_tree() -> TempTree {
    let mut tree = TempTree::new();
    tree.write("a.txt", "a");
    tree.write("b.txt", "b");
    tree
}

#[tokio::test]
async fn awaited_per_file_handler_sees_each_change() {
    init_tracing();
    let mut tree = txt_tree();
    let rec = Recorder::new();

    let mut watcher = AsyncWatcher::new();
    watcher
        .register(
            tree.pattern("*.txt"),
            rec.awaited_handler(),
            TriggerMode::PerFile,
            DispatchStyle::WithChanges,
        )
        .unwrap();

    with_timeout(watcher.check()).await.unwrap();
    assert_eq!(rec.count(), 0);

    tree.write("a.txt", "changed");
    tree.remove("b.txt");
    tree.write("c.txt", "new");
    with_timeout(watcher.check()).await.unwrap();

    assert_eq!(
        rec.pairs(),
        vec![
            (tree.key("b.txt"), EventKind::Deleted),
            (tree.key("a.txt"), EventKind::Modified),
            (tree.key("c.txt"), EventKind::Added),
        ]
    );
}

#[tokio::test]
async fn awaited_any_file_handler_gets_one_batch() {
    init_tracing();
    let mut tree = txt_tree();
    let rec = Recorder::new();

    let mut watcher = AsyncWatcher::new();
    watcher
        .register(
            tree.pattern("*.txt"),
            rec.awaited_handler(),
            TriggerMode::AnyFile,
            DispatchStyle::WithChanges,
        )
        .unwrap();

    tree.write("a.txt", "1");
    tree.write("b.txt", "2");
    watcher.check().await.unwrap();

    assert_eq!(
        rec.calls(),
        vec![Payload::Batch(vec![
            Change::new(tree.key("a.txt"), EventKind::Modified),
            Change::new(tree.key("b.txt"), EventKind::Modified),
        ])]
    );

    watcher.check().await.unwrap();
    assert_eq!(rec.count(), 1);
}

#[tokio::test]
async fn blocking_handler_runs_inside_async_engine() {
    init_tracing();
    let mut tree = txt_tree();
    let rec = Recorder::new();

    let mut watcher = AsyncWatcher::new();
    watcher
        .register(
            tree.pattern("*.txt"),
            rec.blocking_handler(),
            TriggerMode::PerFile,
            DispatchStyle::NoArgs,
        )
        .unwrap();

    tree.write("a.txt", "1");
    tree.write("b.txt", "2");
    watcher.check().await.unwrap();

    assert_eq!(rec.calls(), vec![Payload::Empty, Payload::Empty]);
}

#[tokio::test]
async fn callbacks_of_one_cycle_are_awaited_in_order() {
    init_tracing();
    let mut tree = txt_tree();
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::default();

    let mut watcher = AsyncWatcher::new();
    let slow_log = Arc::clone(&log);
    watcher
        .register(
            tree.pattern("a.txt"),
            Handler::awaited(move |_payload: Payload| {
                let log = Arc::clone(&slow_log);
                async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    log.lock().unwrap().push("slow");
                    Ok::<(), anyhow::Error>(())
                }
            }),
            TriggerMode::PerFile,
            DispatchStyle::NoArgs,
        )
        .unwrap();
    let fast_log = Arc::clone(&log);
    watcher
        .register(
            tree.pattern("a.txt"),
            Handler::blocking(move |_payload: Payload| -> anyhow::Result<()> {
                fast_log.lock().unwrap().push("fast");
                Ok(())
            }),
            TriggerMode::PerFile,
            DispatchStyle::NoArgs,
        )
        .unwrap();

    tree.write("a.txt", "x");
    watcher.check().await.unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["slow", "fast"]);
}

#[tokio::test]
async fn last_run_duration_includes_awaited_callbacks() {
    init_tracing();
    let mut tree = txt_tree();

    let mut watcher = AsyncWatcher::new();
    watcher
        .register(
            tree.pattern("*.txt"),
            Handler::awaited(|_payload: Payload| async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<(), anyhow::Error>(())
            }),
            TriggerMode::AnyFile,
            DispatchStyle::NoArgs,
        )
        .unwrap();

    tree.write("b.txt", "x");
    watcher.check().await.unwrap();

    assert!(watcher.last_run_duration() >= Duration::from_millis(50));
}

#[tokio::test]
async fn empty_directory_then_new_files_are_added() {
    init_tracing();
    let mut tree = TempTree::new();
    let rec = Recorder::new();

    let mut watcher = AsyncWatcher::new();
    watcher
        .register(
            tree.pattern("**"),
            rec.awaited_handler(),
            TriggerMode::AnyFile,
            DispatchStyle::WithChanges,
        )
        .unwrap();

    watcher.check().await.unwrap();
    assert_eq!(rec.count(), 0);

    tree.write("one.log", "");
    tree.write("nested/two.log", "");
    watcher.check().await.unwrap();

    assert_eq!(
        rec.pairs(),
        vec![
            (tree.key("nested/two.log"), EventKind::Added),
            (tree.key("one.log"), EventKind::Added),
        ]
    );
}

#[tokio::test]
async fn awaited_failure_is_collected() {
    init_tracing();
    let mut tree = txt_tree();

    let mut watcher = AsyncWatcher::new();
    watcher
        .register(
            vec![tree.path("a.txt")],
            Handler::awaited(|_payload: Payload| async {
                Err::<(), anyhow::Error>(anyhow::anyhow!("async boom"))
            }),
            TriggerMode::PerFile,
            DispatchStyle::WithChanges,
        )
        .unwrap();

    tree.write("a.txt", "x");
    let err = watcher.check().await.unwrap_err();
    assert!(matches!(err, WatcherError::Dispatch(ref f) if f.len() == 1));
    assert!(err.to_string().contains("async boom"));

    watcher.check().await.unwrap();
}
