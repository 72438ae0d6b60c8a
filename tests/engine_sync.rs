use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use watcher_fs::engine::{Payload, Watcher};
use watcher_fs::errors::WatcherError;
use watcher_fs::types::{Change, DispatchStyle, EventKind, TriggerMode};
use watcher_fs::watch::PatternSource;
use watcher_fs_test_utils::{init_tracing, Recorder, TempTree};

fn txt_tree() -> TempTree {
    let mut tree = TempTree::new();
    tree.write("a.txt", "a");
    tree.write("b.txt", "b");
    tree
}

#[test]
fn baseline_is_silent_and_one_edit_is_one_call() {
    init_tracing();
    let mut tree = txt_tree();
    let rec = Recorder::new();

    let mut watcher = Watcher::new();
    watcher
        .register(
            tree.pattern("*.txt"),
            rec.callback(),
            TriggerMode::PerFile,
            DispatchStyle::WithChanges,
        )
        .unwrap();

    watcher.check().unwrap();
    assert_eq!(rec.count(), 0);

    tree.write("a.txt", "changed");
    watcher.check().unwrap();

    assert_eq!(
        rec.calls(),
        vec![Payload::Change(Change::new(tree.key("a.txt"), EventKind::Modified))]
    );
}

#[test]
fn second_check_without_changes_dispatches_nothing() {
    init_tracing();
    let mut tree = txt_tree();
    let rec = Recorder::new();

    let mut watcher = Watcher::new();
    watcher
        .register(
            tree.pattern("*.txt"),
            rec.callback(),
            TriggerMode::PerFile,
            DispatchStyle::WithChanges,
        )
        .unwrap();

    tree.write("c.txt", "new");
    watcher.check().unwrap();
    assert_eq!(rec.take().len(), 1);

    watcher.check().unwrap();
    assert_eq!(rec.count(), 0);
    assert_eq!(watcher.stats().last_dispatches, 0);
}

#[test]
fn any_file_batches_every_change_in_discovery_order() {
    init_tracing();
    let mut tree = TempTree::new();
    tree.write("skin.styl", "body {}");
    tree.write("styl/default.styl", "a {}");
    let rec = Recorder::new();

    let mut watcher = Watcher::new();
    watcher
        .register(
            tree.pattern("**/*.styl"),
            rec.callback(),
            TriggerMode::AnyFile,
            DispatchStyle::WithChanges,
        )
        .unwrap();

    tree.write("skin.styl", "body { color: red }");
    tree.write("styl/default.styl", "a { color: blue }");
    watcher.check().unwrap();

    assert_eq!(
        rec.calls(),
        vec![Payload::Batch(vec![
            Change::new(tree.key("skin.styl"), EventKind::Modified),
            Change::new(tree.key("styl/default.styl"), EventKind::Modified),
        ])]
    );

    watcher.check().unwrap();
    assert_eq!(rec.count(), 1, "any_file must not fire on a quiet cycle");
}

#[test]
fn deletion_reaches_every_interested_registration_and_untracks() {
    init_tracing();
    let mut tree = txt_tree();
    let all = Recorder::new();
    let only_a = Recorder::new();

    let mut watcher = Watcher::new();
    watcher
        .register(
            tree.pattern("*.txt"),
            all.callback(),
            TriggerMode::PerFile,
            DispatchStyle::WithChanges,
        )
        .unwrap();
    watcher
        .register(
            vec![tree.path("a.txt")],
            only_a.callback(),
            TriggerMode::PerFile,
            DispatchStyle::WithChanges,
        )
        .unwrap();

    tree.remove("a.txt");
    watcher.check().unwrap();

    let deleted = (tree.key("a.txt"), EventKind::Deleted);
    assert_eq!(all.pairs(), vec![deleted.clone()]);
    assert_eq!(only_a.pairs(), vec![deleted]);
    assert!(!watcher.tracked().contains(&tree.key("a.txt")));

    tree.write("a.txt", "again");
    watcher.check().unwrap();

    let added = (tree.key("a.txt"), EventKind::Added);
    assert_eq!(all.pairs().last(), Some(&added));
    assert_eq!(only_a.pairs().last(), Some(&added));
}

#[test]
fn no_args_style_calls_once_per_change_without_payload() {
    init_tracing();
    let mut tree = txt_tree();
    let rec = Recorder::new();

    let mut watcher = Watcher::new();
    watcher
        .register(
            tree.pattern("*.txt"),
            rec.callback(),
            TriggerMode::PerFile,
            DispatchStyle::NoArgs,
        )
        .unwrap();

    tree.write("a.txt", "1");
    tree.write("b.txt", "2");
    watcher.check().unwrap();

    assert_eq!(rec.calls(), vec![Payload::Empty, Payload::Empty]);
}

#[test]
fn directories_are_not_tracked() {
    init_tracing();
    let tree = TempTree::new();
    tree.mkdir("folder.txt");
    let rec = Recorder::new();

    let mut watcher = Watcher::new();
    watcher
        .register(
            tree.pattern("*.txt"),
            rec.callback(),
            TriggerMode::PerFile,
            DispatchStyle::WithChanges,
        )
        .unwrap();

    assert!(watcher.tracked().is_empty());
    watcher.check().unwrap();
    assert_eq!(rec.count(), 0);
}

#[test]
fn unmatched_registration_picks_up_files_created_later() {
    init_tracing();
    let mut tree = TempTree::new();
    let rec = Recorder::new();

    let mut watcher = Watcher::new();
    watcher
        .register(
            tree.pattern("src/**/*.rs"),
            rec.callback(),
            TriggerMode::PerFile,
            DispatchStyle::WithChanges,
        )
        .unwrap();
    assert!(watcher.tracked().is_empty());

    tree.write("src/deep/mod.rs", "");
    tree.write("src/notes.md", "");
    watcher.check().unwrap();

    assert_eq!(
        rec.pairs(),
        vec![(tree.key("src/deep/mod.rs"), EventKind::Added)]
    );
}

#[test]
fn explicit_path_list_tracks_paths_that_appear_later() {
    init_tracing();
    let mut tree = txt_tree();
    let rec = Recorder::new();

    let paths: Vec<PathBuf> = vec![tree.path("a.txt"), tree.path("later.txt")];
    let mut watcher = Watcher::new();
    watcher
        .register(
            PatternSource::from(paths),
            rec.callback(),
            TriggerMode::PerFile,
            DispatchStyle::WithChanges,
        )
        .unwrap();
    assert_eq!(watcher.tracked().len(), 1);

    tree.write("b.txt", "not watched");
    tree.write("later.txt", "now");
    watcher.check().unwrap();

    assert_eq!(
        rec.pairs(),
        vec![(tree.key("later.txt"), EventKind::Added)]
    );
}

#[test]
fn failing_callback_is_reported_without_blocking_others_or_redelivering() {
    init_tracing();
    let mut tree = txt_tree();
    let failing = Recorder::new();
    let healthy = Recorder::new();

    let mut watcher = Watcher::new();
    watcher
        .register(
            tree.pattern("*.txt"),
            failing.failing_callback("boom"),
            TriggerMode::PerFile,
            DispatchStyle::WithChanges,
        )
        .unwrap();
    watcher
        .register(
            tree.pattern("*.txt"),
            healthy.callback(),
            TriggerMode::PerFile,
            DispatchStyle::WithChanges,
        )
        .unwrap();

    tree.write("a.txt", "x");
    tree.write("b.txt", "y");

    match watcher.check() {
        Err(WatcherError::Dispatch(failures)) => {
            assert_eq!(failures.len(), 2);
            assert!(failures.iter().all(|f| f.registration == 0));
            assert!(failures[0].error.to_string().contains("boom"));
        }
        other => panic!("expected dispatch failure, got {other:?}"),
    }
    assert_eq!(healthy.count(), 2);
    assert_eq!(watcher.stats().last_failures, 2);

    watcher.check().unwrap();
    assert_eq!(failing.count(), 2);
    assert_eq!(healthy.count(), 2);
}

#[test]
fn last_run_duration_covers_callbacks() {
    init_tracing();
    let mut tree = txt_tree();

    let mut watcher = Watcher::new();
    watcher
        .register(
            tree.pattern("*.txt"),
            |_payload: Payload| -> anyhow::Result<()> {
                thread::sleep(Duration::from_millis(50));
                Ok(())
            },
            TriggerMode::AnyFile,
            DispatchStyle::NoArgs,
        )
        .unwrap();

    tree.write("a.txt", "x");
    watcher.check().unwrap();

    assert!(watcher.last_run_duration() >= Duration::from_millis(50));
    assert_eq!(watcher.stats().cycles, 1);
}

#[test]
fn invalid_glob_is_rejected_at_registration() {
    let tree = TempTree::new();
    let rec = Recorder::new();
    let mut watcher = Watcher::new();

    let err = watcher
        .register(
            tree.pattern("[unclosed"),
            rec.callback(),
            TriggerMode::PerFile,
            DispatchStyle::WithChanges,
        )
        .unwrap_err();

    assert!(matches!(err, WatcherError::Pattern(_)));
    assert!(watcher.registrations().is_empty());
}
