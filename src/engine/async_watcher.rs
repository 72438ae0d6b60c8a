// src/engine/async_watcher.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::engine::core::{EngineCore, Registration};
use crate::engine::dispatch::{AsyncDispatcher, Handler};
use crate::engine::{cycle_result, EngineRunStats};
use crate::errors::{DispatchFailure, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::{DispatchStyle, RegistrationId, TriggerMode};
use crate::watch::patterns::PatternSource;
use crate::watch::tracked::TrackedFiles;

/// Cooperative change-detection engine.
///
/// Same diff semantics as [`crate::engine::Watcher`]. `check()` suspends at
/// each awaited callback but still awaits them one after another, in
/// delivery order, so all side effects of a cycle are done when it returns.
#[derive(Debug)]
pub struct AsyncWatcher {
    core: EngineCore,
    dispatchers: Vec<AsyncDispatcher>,
}

impl Default for AsyncWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncWatcher {
    pub fn new() -> Self {
        Self::with_fs(Arc::new(RealFileSystem))
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            core: EngineCore::new(fs),
            dispatchers: Vec::new(),
        }
    }

    /// Register a handler for files matched by `source`.
    ///
    /// Use [`Handler::awaited`] for async callbacks and
    /// [`Handler::blocking`] for plain functions.
    pub fn register(
        &mut self,
        source: impl Into<PatternSource>,
        handler: Handler,
        trigger: TriggerMode,
        style: DispatchStyle,
    ) -> Result<RegistrationId> {
        let id = self.core.register(source.into(), trigger, style)?;
        self.dispatchers.push(AsyncDispatcher::new(style, handler));
        Ok(id)
    }

    /// Run one check cycle, awaiting every callback sequentially.
    pub async fn check(&mut self) -> Result<()> {
        let started = Instant::now();
        let deliveries = self.core.plan();
        let dispatches = deliveries.len();

        let mut failures = Vec::new();
        for delivery in deliveries {
            let registration = delivery.registration();
            if let Err(error) = self.dispatchers[registration].dispatch(delivery).await {
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
