// src/watch/diff.rs

//! Pure diff between the tracked baseline and a fresh snapshot.
//!
//! [`plan_cycle`] takes the previous [`TrackedFiles`], the paths matched in
//! this cycle (with the registrations interested in each), and a timestamp
//! source. It returns the ordered list of deliveries to make plus the next
//! baseline. Nothing here calls callbacks or touches the real filesystem.

use std::collections::{BTreeMap, BTreeSet};
use std::time::SystemTime;

use tracing::{debug, trace};

use crate::types::{Change, EventKind, RegistrationId, TriggerMode};
use crate::watch::tracked::TrackedFiles;

/// Paths matched in the current cycle -> registrations matching them.
pub type CurrentFiles = BTreeMap<String, BTreeSet<RegistrationId>>;

/// One callback invocation the engine has to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// `PerFile`: one change, delivered in discovery order.
    Change {
        registration: RegistrationId,
        change: Change,
    },
    /// `AnyFile`: every change of the cycle for this registration.
    Batch {
        registration: RegistrationId,
        changes: Vec<Change>,
    },
}

impl Delivery {
    pub fn registration(&self) -> RegistrationId {
        match self {
            Delivery::Change { registration, .. } | Delivery::Batch { registration, .. } => {
                *registration
            }
        }
    }

    pub fn changes(&self) -> &[Change] {
        match self {
            Delivery::Change { change, .. } => std::slice::from_ref(change),
            Delivery::Batch { changes, .. } => changes,
        }
    }
}

/// Result of diffing one cycle.
#[derive(Debug, Clone, Default)]
pub struct CyclePlan {
    pub deliveries: Vec<Delivery>,
    pub tracked: TrackedFiles,
}

/// Collects deliveries while the diff runs.
struct Pending<'a> {
    triggers: &'a [TriggerMode],
    deliveries: Vec<Delivery>,
    batches: BTreeMap<RegistrationId, Vec<Change>>,
}

impl<'a> Pending<'a> {
    fn new(triggers: &'a [TriggerMode]) -> Self {
        Self {
            triggers,
            deliveries: Vec::new(),
            batches: BTreeMap::new(),
        }
    }

    fn emit(&mut self, registration: RegistrationId, change: Change) {
        debug!(registration, path = %change.path, kind = %change.kind, "change detected");
        match self.triggers[registration] {
            TriggerMode::PerFile => self.deliveries.push(Delivery::Change {
                registration,
                change,
            }),
            TriggerMode::AnyFile => self.batches.entry(registration).or_default().push(change),
        }
    }

    /// Append one aggregated delivery per registration with a non-empty batch.
    fn finish(mut self) -> Vec<Delivery> {
        for (registration, changes) in std::mem::take(&mut self.batches) {
            self.deliveries.push(Delivery::Batch {
                registration,
                changes,
            });
        }
        self.deliveries
    }
}

/// Diff `previous` against `current`.
///
/// - Deletions first, in tracked-path order, once per registration that was
///   tracking the path.
/// - Then additions and modifications in `current` order, once per
///   registration currently matching the path.
/// - `AnyFile` registrations get one batch each at the end, in registration
///   order, and only if something changed for them.
///
/// `stat` returning `None` means the file could not be read this cycle: a new
/// path is skipped, an already tracked path keeps its previous timestamp.
///
/// Panics if a registration id in `previous` or `current` has no entry in
/// `triggers`.
pub fn plan_cycle<F>(
    previous: &TrackedFiles,
    current: &CurrentFiles,
    triggers: &[TriggerMode],
    mut stat: F,
) -> CyclePlan
where
    F: FnMut(&str) -> Option<SystemTime>,
{
    let mut pending = Pending::new(triggers);

    for (path, file) in previous.iter() {
        if current.contains_key(path) {
            continue;
        }
        for &registration in &file.registrations {
            pending.emit(registration, Change::new(path, EventKind::Deleted));
        }
    }

    let mut tracked = TrackedFiles::new();
    for (path, registrations) in current {
        let before = previous.get(path);

        let Some(modified) = stat(path) else {
            trace!(%path, "modification time unavailable; skipping this cycle");
            if let Some(before) = before {
                tracked.insert(path.clone(), registrations.clone(), before.modified);
            }
            continue;
        };

        let kind = match before {
            None => Some(EventKind::Added),
            Some(before) if before.modified != modified => Some(EventKind::Modified),
            Some(_) => None,
        };

        tracked.insert(path.clone(), registrations.clone(), modified);

        if let Some(kind) = kind {
            for &registration in registrations {
                pending.emit(registration, Change::new(path.clone(), kind));
            }
        }
    }

    CyclePlan {
        deliveries: pending.finish(),
        tracked,
    }
}
