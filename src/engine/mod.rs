// src/engine/mod.rs

//! Change-detection engine.
//!
//! - [`core`] owns registrations and the tracked-file baseline, and turns a
//!   check cycle into ordered deliveries.
//! - [`dispatch`] shapes deliveries into callback payloads.
//! - [`watcher`] is the synchronous front-end: `check()` runs every callback
//!   inline before returning.
//! - [`async_watcher`] is the cooperative front-end: `check()` awaits each
//!   callback in turn, never fanning out within a cycle.
//!
//! At most one `check()` may be in flight per engine; both front-ends take
//! `&mut self` so the borrow checker enforces that.

use std::time::Duration;

use crate::errors::{DispatchFailure, Result, WatcherError};

pub mod async_watcher;
pub mod core;
pub mod dispatch;
pub mod watcher;

pub use async_watcher::AsyncWatcher;
pub use self::core::{EngineCore, Registration};
pub use dispatch::{AsyncCallback, Callback, CallbackFuture, Handler, Payload};
pub use watcher::Watcher;

/// Bookkeeping for the most recent check cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineRunStats {
    /// Wall-clock time of the last cycle, callbacks included.
    pub last_run_duration: Duration,
    /// Callback invocations made in the last cycle.
    pub last_dispatches: usize,
    /// How many of those returned an error.
    pub last_failures: usize,
    /// Completed cycles since the engine was created.
    pub cycles: u64,
}

fn cycle_result(failures: Vec<DispatchFailure>) -> Result<()> {
    if failures.is_empty() {
        Ok(())
    } else {
        Err(WatcherError::Dispatch(failures))
    }
}
