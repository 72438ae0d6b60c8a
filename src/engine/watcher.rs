// src/engine/watcher.rs

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::engine::core::{EngineCore, Registration};
use crate::engine::dispatch::{Callback, Dispatcher};
use crate::engine::{cycle_result, EngineRunStats};
use crate::errors::{DispatchFailure, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::{DispatchStyle, RegistrationId, TriggerMode};
use crate::watch::patterns::PatternSource;
use crate::watch::tracked::TrackedFiles;

/// Synchronous change-detection engine.
///
/// `check()` runs to completion, callbacks included, before returning. A
/// callback that blocks stalls the whole cycle; scheduling repeated checks is
/// up to the caller.
///
/// ```no_run
/// use watcher_fs::engine::{Payload, Watcher};
/// use watcher_fs::types::{DispatchStyle, TriggerMode};
///
/// let mut watcher = Watcher::new();
/// watcher.register(
///     "assets/**/*.styl",
///     |payload: Payload| -> anyhow::Result<()> {
///         println!("{} change(s)", payload.changes().len());
///         Ok(())
///     },
///     TriggerMode::AnyFile,
///     DispatchStyle::WithChanges,
/// )?;
/// watcher.check()?;
/// # Ok::<(), watcher_fs::errors::WatcherError>(())
/// ```
pub struct Watcher {
    core: EngineCore,
    dispatchers: Vec<Dispatcher>,
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl Default for Watcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Watcher {
    pub fn new() -> Self {
        Self::with_fs(Arc::new(RealFileSystem))
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            core: EngineCore::new(fs),
            dispatchers: Vec::new(),
        }
    }

    /// Register `callback` for files matched by `source`.
    ///
    /// Captures the baseline snapshot; no callback fires until a later
    /// `check()` sees a difference.
    pub fn register<C>(
        &mut self,
        source: impl Into<PatternSource>,
        callback: C,
        trigger: TriggerMode,
        style: DispatchStyle,
    ) -> Result<RegistrationId>
    where
        C: Callback + 'static,
    {
        let id = self.core.register(source.into(), trigger, style)?;
        self.dispatchers
            .push(Dispatcher::new(style, Box::new(callback)));
        Ok(id)
    }

    /// Run one check cycle.
    ///
    /// Every delivery of the cycle is attempted. If any callback failed, the
    /// failures are returned together as `WatcherError::Dispatch`; the new
    /// baseline is committed either way.
    pub fn check(&mut self) -> Result<()> {
        let started = Instant::now();
        let deliveries = self.core.plan();
        let dispatches = deliveries.len();

        let mut failures = Vec::new();
        for delivery in deliveries {
            let registration = delivery.registration();
            if let Err(error) = self.dispatchers[registration].dispatch(delivery) {
                warn!(registration, error = %error, "callback failed");
                failures.push(DispatchFailure {
                    registration,
                    error,
                });
            }
        }

        self.core.finish_cycle(started, dispatches, failures.len());
        cycle_result(failures)
    }

    pub fn stats(&self) -> EngineRunStats {
        self.core.stats()
    }

    pub fn last_run_duration(&self) -> Duration {
        self.core.stats().last_run_duration
    }

    pub fn tracked(&self) -> &TrackedFiles {
        self.core.tracked()
    }

    pub fn registrations(&self) -> &[Registration] {
        self.core.registrations()
    }
}
