// src/engine/core.rs

//! Engine state shared by the synchronous and asynchronous watchers.
//!
//! [`EngineCore`] owns the registrations and the tracked-file baseline and
//! turns each check cycle into an ordered list of [`Delivery`]s. It never
//! calls user callbacks; the two watcher front-ends do that, either inline or
//! by awaiting, so both share exactly the same diff semantics.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, trace};

use crate::engine::EngineRunStats;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::{DispatchStyle, RegistrationId, TriggerMode};
use crate::watch::diff::{plan_cycle, CurrentFiles, Delivery};
use crate::watch::patterns::{PatternMatcher, PatternSource};
use crate::watch::tracked::TrackedFiles;

/// One registered interest. Immutable after `register`.
#[derive(Debug, Clone)]
pub struct Registration {
    id: RegistrationId,
    matcher: PatternMatcher,
    trigger: TriggerMode,
    style: DispatchStyle,
}

impl Registration {
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    pub fn source(&self) -> &PatternSource {
        self.matcher.source()
    }

    pub fn trigger(&self) -> TriggerMode {
        self.trigger
    }

    pub fn style(&self) -> DispatchStyle {
        self.style
    }
}

pub struct EngineCore {
    fs: Arc<dyn FileSystem>,
    registrations: Vec<Registration>,
    tracked: TrackedFiles,
    stats: EngineRunStats,
}

impl fmt::Debug for EngineCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineCore")
            .field("registrations", &self.registrations.len())
            .field("tracked", &self.tracked.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl EngineCore {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            registrations: Vec::new(),
            tracked: TrackedFiles::new(),
            stats: EngineRunStats::default(),
        }
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn tracked(&self) -> &TrackedFiles {
        &self.tracked
    }

    pub fn stats(&self) -> EngineRunStats {
        self.stats
    }

    /// Add a registration and record its baseline snapshot.
    ///
    /// Files whose timestamp cannot be read are left out of the baseline.
    pub fn register(
        &mut self,
        source: PatternSource,
        trigger: TriggerMode,
        style: DispatchStyle,
    ) -> Result<RegistrationId> {
        let matcher = PatternMatcher::compile(source)?;
        let id = self.registrations.len();

        let mut baseline = 0usize;
        for path in matcher.resolve(self.fs.as_ref()) {
            match self.fs.modified(Path::new(&path)) {
                Ok(modified) => {
                    self.tracked.track(path, id, modified);
                    baseline += 1;
                }
                Err(err) => {
                    trace!(%path, error = %err, "not tracking unreadable file");
                }
            }
        }

        info!(
            registration = id,
            source = %matcher.source(),
            trigger = %trigger,
            files = baseline,
            "registered watch"
        );

        self.registrations.push(Registration {
            id,
            matcher,
            trigger,
            style,
        });
        Ok(id)
    }

    /// Re-resolve every registration, diff against the baseline, and commit
    /// the new baseline. Returns the deliveries to make, in order.
    pub fn plan(&mut self) -> Vec<Delivery> {
        let mut current = CurrentFiles::new();
        for registration in &self.registrations {
            for path in registration.matcher.resolve(self.fs.as_ref()) {
                current.entry(path).or_default().insert(registration.id);
            }
        }

        let triggers: Vec<TriggerMode> = self.registrations.iter().map(|r| r.trigger).collect();
        let fs = Arc::clone(&self.fs);
        let plan = plan_cycle(&self.tracked, &current, &triggers, |path| {
            fs.modified(Path::new(path)).ok()
        });

        self.tracked = plan.tracked;
        plan.deliveries
    }

    /// Record stats for a cycle that started at `started`.
    pub fn finish_cycle(&mut self, started: Instant, dispatches: usize, failures: usize) {
        self.stats = EngineRunStats {
            last_run_duration: started.elapsed(),
            last_dispatches: dispatches,
            last_failures: failures,
            cycles: self.stats.cycles + 1,
        };
        debug!(
            elapsed = ?self.stats.last_run_duration,
            dispatches,
            failures,
            tracked = self.tracked.len(),
            "check cycle finished"
        );
    }
}
