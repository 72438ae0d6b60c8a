// src/watch/tracked.rs

use std::collections::{BTreeMap, BTreeSet};
use std::time::SystemTime;

use crate::types::RegistrationId;

/// State kept for one file the engine currently believes exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    /// Registrations whose pattern matched this path when it was last seen.
    pub registrations: BTreeSet<RegistrationId>,
    /// Modification time recorded at that point.
    pub modified: SystemTime,
}

/// Engine-owned map of normalized path -> [`TrackedFile`].
///
/// Invariant: no entry ever has an empty registration set. Iteration order is
/// the path order, which is the order deletions are discovered in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedFiles {
    files: BTreeMap<String, TrackedFile>,
}

impl TrackedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&TrackedFile> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrackedFile)> {
        self.files.iter().map(|(path, file)| (path.as_str(), file))
    }

    /// Insert or replace an entry. Empty registration sets are dropped.
    pub fn insert(
        &mut self,
        path: impl Into<String>,
        registrations: BTreeSet<RegistrationId>,
        modified: SystemTime,
    ) {
        let path = path.into();
        if registrations.is_empty() {
            self.files.remove(&path);
            return;
        }
        self.files.insert(
            path,
            TrackedFile {
                registrations,
                modified,
            },
        );
    }

    /// Associate `registration` with `path`.
    ///
    /// An already tracked path keeps its recorded timestamp, so a change that
    /// happened since another registration's baseline is not swallowed.
    pub fn track(&mut self, path: impl Into<String>, registration: RegistrationId, modified: SystemTime) {
        self.files
            .entry(path.into())
            .or_insert_with(|| TrackedFile {
                registrations: BTreeSet::new(),
                modified,
            })
            .registrations
            .insert(registration);
    }

    pub fn remove(&mut self, path: &str) -> Option<TrackedFile> {
        self.files.remove(path)
    }
}
