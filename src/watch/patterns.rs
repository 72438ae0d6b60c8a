// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, trace};

use crate::errors::{Result, WatcherError};
use crate::fs::FileSystem;
use crate::watch::path_utils::{
    glob_names_hidden, glob_walk_root, is_glob, normalize_path, normalize_pattern,
};

/// What a registration watches: a glob, or an explicit ordered list of paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSource {
    /// Glob-style pattern, e.g. `"assets/**/*.styl"`.
    ///
    /// `*` and `?` never cross a `/`; `**` spans any number of directories.
    Glob(String),
    /// Explicit file list. Missing entries are simply not matched.
    Paths(Vec<PathBuf>),
}

impl fmt::Display for PatternSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternSource::Glob(pattern) => f.write_str(pattern),
            PatternSource::Paths(paths) => {
                let rendered: Vec<String> = paths.iter().map(|p| normalize_path(p)).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}

impl From<&str> for PatternSource {
    fn from(pattern: &str) -> Self {
        PatternSource::Glob(pattern.to_string())
    }
}

impl From<String> for PatternSource {
    fn from(pattern: String) -> Self {
        PatternSource::Glob(pattern)
    }
}

impl From<&Path> for PatternSource {
    fn from(path: &Path) -> Self {
        PatternSource::Glob(path.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for PatternSource {
    fn from(path: PathBuf) -> Self {
        PatternSource::from(path.as_path())
    }
}

impl From<Vec<PathBuf>> for PatternSource {
    fn from(paths: Vec<PathBuf>) -> Self {
        PatternSource::Paths(paths)
    }
}

impl From<Vec<String>> for PatternSource {
    fn from(paths: Vec<String>) -> Self {
        PatternSource::Paths(paths.into_iter().map(PathBuf::from).collect())
    }
}

#[derive(Clone)]
enum MatcherKind {
    Glob {
        root: PathBuf,
        max_depth: Option<usize>,
        glob: GlobMatcher,
        hidden: bool,
    },
    Literal(Vec<PathBuf>),
}

/// Compiled form of a [`PatternSource`].
///
/// Compiled once at registration time, then resolved against the filesystem
/// on every check cycle.
#[derive(Clone)]
pub struct PatternMatcher {
    source: PatternSource,
    kind: MatcherKind,
}

impl fmt::Debug for PatternMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternMatcher")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl PatternMatcher {
    pub fn compile(source: PatternSource) -> Result<Self> {
        let kind = match &source {
            PatternSource::Glob(raw) => {
                let pattern = normalize_pattern(raw);
                if is_glob(&pattern) {
                    let glob = GlobBuilder::new(&pattern)
                        .literal_separator(true)
                        .build()
                        .map_err(|e| {
                            WatcherError::Pattern(format!("invalid glob pattern {raw}: {e}"))
                        })?
                        .compile_matcher();
                    let (root, max_depth) = glob_walk_root(&pattern);
                    MatcherKind::Glob {
                        root,
                        max_depth,
                        glob,
                        hidden: glob_names_hidden(&pattern),
                    }
                } else {
                    MatcherKind::Literal(vec![PathBuf::from(pattern)])
                }
            }
            PatternSource::Paths(paths) => MatcherKind::Literal(paths.clone()),
        };

        Ok(Self { source, kind })
    }

    pub fn source(&self) -> &PatternSource {
        &self.source
    }

    /// Resolve to the normalized paths of all existing regular files matched
    /// right now.
    ///
    /// Sorted and de-duplicated. Unreadable directories are skipped.
    pub fn resolve(&self, fs: &dyn FileSystem) -> Vec<String> {
        let mut files = match &self.kind {
            MatcherKind::Glob {
                root,
                max_depth,
                glob,
                hidden,
            } => walk_matching(fs, root, *max_depth, glob, *hidden),
            MatcherKind::Literal(paths) => paths
                .iter()
                .filter(|p| fs.is_file(p))
                .map(|p| normalize_path(p))
                .collect(),
        };

        files.sort();
        files.dedup();
        trace!(source = %self.source, matched = files.len(), "resolved pattern");
        files
    }
}

/// Walk `root` collecting files whose normalized path matches `glob`.
///
/// `max_depth` bounds how many directory levels below `root` a file may sit
/// (1 = direct children); `None` means unbounded. Unless `hidden` is set,
/// dot-files and dot-directories below `root` are neither matched nor entered.
fn walk_matching(
    fs: &dyn FileSystem,
    root: &Path,
    max_depth: Option<usize>,
    glob: &GlobMatcher,
    hidden: bool,
) -> Vec<String> {
    let mut files = Vec::new();
    let mut stack = vec![(root.to_path_buf(), 0usize)];

    while let Some((dir, depth)) = stack.pop() {
        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(?dir, error = %err, "skipping unreadable directory");
                continue;
            }
        };

        for path in entries {
            if !hidden && is_hidden(&path) {
                continue;
            }
            if fs.is_dir(&path) {
                if max_depth.is_none_or(|max| depth + 1 < max) {
                    stack.push((path, depth + 1));
                }
            } else if fs.is_file(&path) {
                let normalized = normalize_path(&path);
                if glob.is_match(&normalized) {
                    files.push(normalized);
                }
            }
        }
    }

    files
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn fixture() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("/p/a.txt");
        fs.add_file("/p/b.txt");
        fs.add_file("/p/c.md");
        fs.add_file("/p/sub/d.txt");
        fs.add_file("/p/sub/deeper/e.txt");
        fs.add_dir("/p/dir.txt");
        fs
    }

    fn resolve(fs: &MockFileSystem, source: impl Into<PatternSource>) -> Vec<String> {
        PatternMatcher::compile(source.into()).unwrap().resolve(fs)
    }

    #[test]
    fn single_star_does_not_cross_directories() {
        let fs = fixture();
        assert_eq!(resolve(&fs, "/p/*.txt"), vec!["/p/a.txt", "/p/b.txt"]);
    }

    #[test]
    fn double_star_is_recursive() {
        let fs = fixture();
        assert_eq!(
            resolve(&fs, "/p/**/*.txt"),
            vec![
                "/p/a.txt",
                "/p/b.txt",
                "/p/sub/d.txt",
                "/p/sub/deeper/e.txt"
            ]
        );
    }

    #[test]
    fn trailing_double_star_matches_every_file() {
        let fs = fixture();
        assert_eq!(resolve(&fs, "/p/sub/**").len(), 2);
    }

    #[test]
    fn directories_are_never_matched() {
        let fs = fixture();
        assert!(!resolve(&fs, "/p/*.txt").contains(&"/p/dir.txt".to_string()));
    }

    #[test]
    fn explicit_paths_keep_only_existing_files() {
        let fs = fixture();
        let source = PatternSource::Paths(vec![
            PathBuf::from("/p/b.txt"),
            PathBuf::from("/p/./a.txt"),
            PathBuf::from("/p/missing.txt"),
            PathBuf::from("/p/dir.txt"),
            PathBuf::from("/p/a.txt"),
        ]);
        assert_eq!(resolve(&fs, source), vec!["/p/a.txt", "/p/b.txt"]);
    }

    #[test]
    fn literal_glob_behaves_like_a_path() {
        let fs = fixture();
        assert_eq!(resolve(&fs, "/p/./c.md"), vec!["/p/c.md"]);
        assert!(resolve(&fs, "/p/nope.md").is_empty());
    }

    #[test]
    fn relative_patterns_resolve_relative_paths() {
        let fs = MockFileSystem::new();
        fs.add_file("a.txt");
        fs.add_file("src/b.txt");
        assert_eq!(resolve(&fs, "./*.txt"), vec!["a.txt"]);
        assert_eq!(resolve(&fs, "**/*.txt"), vec!["a.txt", "src/b.txt"]);
    }

    #[test]
    fn unmatched_root_is_empty_not_error() {
        let fs = fixture();
        assert!(resolve(&fs, "/nowhere/**/*.txt").is_empty());
    }

    #[test]
    fn wildcards_skip_hidden_entries_below_the_root() {
        let fs = MockFileSystem::new();
        fs.add_file("/p/a.txt");
        fs.add_file("/p/.a.txt.swp");
        fs.add_file("/p/.git/HEAD");
        fs.add_file("/p/sub/.env");
        fs.add_file("/.cache/x.txt");

        assert_eq!(resolve(&fs, "/p/**"), vec!["/p/a.txt"]);
        assert_eq!(resolve(&fs, "/p/.*"), vec!["/p/.a.txt.swp"]);
        assert_eq!(resolve(&fs, "/p/**/.env"), vec!["/p/sub/.env"]);
        assert_eq!(resolve(&fs, "/.cache/*.txt"), vec!["/.cache/x.txt"]);
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let err = PatternMatcher::compile("/p/[*.txt".into()).unwrap_err();
        assert!(matches!(err, WatcherError::Pattern(_)));
    }
}
