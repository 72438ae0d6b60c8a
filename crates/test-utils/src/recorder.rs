#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use watcher_fs::engine::{Handler, Payload};
use watcher_fs::types::{Change, EventKind};

/// Captures every payload a callback receives, in call order.
///
/// Clones share the same log, so one copy can be moved into the engine while
/// the test inspects another.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Payload>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Vec<Payload>> {
        self.calls.lock().expect("recorder lock poisoned")
    }

    /// Synchronous callback for `Watcher::register`.
    pub fn callback(&self) -> impl FnMut(Payload) -> anyhow::Result<()> + Send + 'static {
        let calls = Arc::clone(&self.calls);
        move |payload: Payload| {
            calls.lock().expect("recorder lock poisoned").push(payload);
            Ok(())
        }
    }

    /// A callback that records and then fails.
    pub fn failing_callback(
        &self,
        message: &'static str,
    ) -> impl FnMut(Payload) -> anyhow::Result<()> + Send + 'static {
        let calls = Arc::clone(&self.calls);
        move |payload: Payload| {
            calls.lock().expect("recorder lock poisoned").push(payload);
            Err(anyhow::anyhow!(message))
        }
    }

    pub fn blocking_handler(&self) -> Handler {
        Handler::blocking(self.callback())
    }

    /// Async handler that yields once before recording.
    pub fn awaited_handler(&self) -> Handler {
        let calls = Arc::clone(&self.calls);
        Handler::awaited(move |payload: Payload| {
            let calls = Arc::clone(&calls);
            async move {
                tokio::task::yield_now().await;
                calls.lock().expect("recorder lock poisoned").push(payload);
                Ok::<(), anyhow::Error>(())
            }
        })
    }

    pub fn calls(&self) -> Vec<Payload> {
        self.log().clone()
    }

    pub fn count(&self) -> usize {
        self.log().len()
    }

    /// Every change received, flattened across calls.
    pub fn changes(&self) -> Vec<Change> {
        self.log()
            .iter()
            .flat_map(|payload| payload.changes().to_vec())
            .collect()
    }

    /// `(path, kind)` pairs, convenient for `assert_eq!`.
    pub fn pairs(&self) -> Vec<(String, EventKind)> {
        self.changes()
            .into_iter()
            .map(|change| (change.path, change.kind))
            .collect()
    }

    /// Drain the log, returning what was recorded so far.
    pub fn take(&self) -> Vec<Payload> {
        std::mem::take(&mut *self.log())
    }
}
