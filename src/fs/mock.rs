// src/fs/mock.rs

//! In-memory filesystem with explicit modification times.
//!
//! Every write advances a logical clock, so two writes to the same file are
//! always observed as distinct timestamps. This keeps engine tests free of
//! real-filesystem mtime granularity.

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { modified: SystemTime, accessible: bool },
    Dir,
}

#[derive(Debug, Default)]
struct MockState {
    entries: BTreeMap<PathBuf, MockEntry>,
    clock: u64,
}

impl MockState {
    fn tick(&mut self) -> SystemTime {
        self.clock += 1;
        UNIX_EPOCH + Duration::from_secs(1_000_000 + self.clock)
    }

    fn ensure_parents(&mut self, path: &Path) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir.as_os_str().is_empty() {
                break;
            }
            self.entries
                .entry(dir.to_path_buf())
                .or_insert(MockEntry::Dir);
            current = dir.parent();
        }
    }
}

/// Cloning shares the underlying state, so a test can keep a handle while the
/// engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock filesystem lock poisoned")
    }

    /// Create or overwrite a file, bumping its modification time.
    pub fn add_file(&self, path: impl AsRef<Path>) -> SystemTime {
        let path = path.as_ref();
        let mut state = self.state();
        let modified = state.tick();
        state.ensure_parents(path);
        state.entries.insert(
            path.to_path_buf(),
            MockEntry::File {
                modified,
                accessible: true,
            },
        );
        modified
    }

    /// Alias for [`MockFileSystem::add_file`] that reads better for edits.
    pub fn touch(&self, path: impl AsRef<Path>) -> SystemTime {
        self.add_file(path)
    }

    /// Set an explicit modification time (e.g. to simulate an unchanged stamp).
    pub fn set_modified(&self, path: impl AsRef<Path>, when: SystemTime) {
        let mut state = self.state();
        if let Some(MockEntry::File { modified, .. }) = state.entries.get_mut(path.as_ref()) {
            *modified = when;
        }
    }

    /// Make `modified` fail for this file while keeping it listed.
    pub fn set_accessible(&self, path: impl AsRef<Path>, value: bool) {
        let mut state = self.state();
        if let Some(MockEntry::File { accessible, .. }) = state.entries.get_mut(path.as_ref()) {
            *accessible = value;
        }
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.state();
        state.ensure_parents(path);
        state.entries.insert(path.to_path_buf(), MockEntry::Dir);
    }

    /// Remove a file, or a directory together with everything below it.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.state();
        state.entries.retain(|p, _| !p.starts_with(path));
    }
}

impl FileSystem for MockFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        matches!(self.state().entries.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.state().entries.get(path), Some(MockEntry::Dir))
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        match self.state().entries.get(path) {
            Some(MockEntry::File {
                modified,
                accessible: true,
            }) => Ok(*modified),
            Some(MockEntry::File { .. }) => Err(anyhow!("Permission denied: {:?}", path)),
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state();
        let lookup = if path == Path::new(".") { Path::new("") } else { path };
        if !lookup.as_os_str().is_empty() && !matches!(state.entries.get(lookup), Some(MockEntry::Dir)) {
            return Err(anyhow!("Not a directory or not found: {:?}", path));
        }
        Ok(state
            .entries
            .keys()
            .filter(|p| p.parent() == Some(lookup))
            .cloned()
            .collect())
    }
}
