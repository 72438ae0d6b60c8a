#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use watcher_fs::fs::FileSystem;
use watcher_fs::fs::mock::MockFileSystem;
use watcher_fs::watch::path_utils::normalize_path;

/// Share a mock with an engine while keeping a handle to mutate it.
pub fn shared(fs: &MockFileSystem) -> Arc<dyn FileSystem> {
    Arc::new(fs.clone())
}

/// A real temporary directory whose files get strictly increasing,
/// explicitly set modification times, so edits are never lost to coarse
/// filesystem timestamp resolution.
pub struct TempTree {
    dir: TempDir,
    clock: SystemTime,
}

impl Default for TempTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TempTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
            clock: SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Path string as the engine reports it.
    pub fn key(&self, rel: &str) -> String {
        normalize_path(&self.path(rel))
    }

    /// Glob rooted at this directory, e.g. `pattern("**/*.txt")`.
    pub fn pattern(&self, rel_glob: &str) -> String {
        format!("{}/{}", normalize_path(self.dir.path()), rel_glob)
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).expect("failed to create dir");
        path
    }

    /// Create or overwrite a file and give it a fresh modification time.
    pub fn write(&mut self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, contents).expect("failed to write file");
        self.stamp(&path);
        path
    }

    /// Bump the modification time without changing contents.
    pub fn touch(&mut self, rel: &str) {
        let path = self.path(rel);
        self.stamp(&path);
    }

    pub fn remove(&self, rel: &str) {
        let path = self.path(rel);
        if path.is_dir() {
            fs::remove_dir_all(&path).expect("failed to remove dir");
        } else {
            fs::remove_file(&path).expect("failed to remove file");
        }
    }

    fn stamp(&mut self, path: &Path) {
        self.clock += Duration::from_secs(1);
        fs::File::options()
            .write(true)
            .open(path)
            .and_then(|file| file.set_modified(self.clock))
            .expect("failed to set modification time");
    }
}
