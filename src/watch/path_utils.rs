// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Component, Path, PathBuf};

/// Characters that turn a path segment into a glob segment.
const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Render `path` as a string with forward slashes and no `.` segments.
///
/// Every path the engine tracks or emits goes through here, so the same file
/// reached as `./src/a.rs`, `src//a.rs` or `src\a.rs` maps to one key.
pub fn normalize_path(path: &Path) -> String {
    let mut out = String::new();
    for comp in path.components() {
        match comp {
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::RootDir => out.push('/'),
            Component::CurDir => {}
            Component::ParentDir => push_segment(&mut out, ".."),
            Component::Normal(seg) => push_segment(&mut out, &seg.to_string_lossy()),
        }
    }
    if out.is_empty() {
        out.push('.');
    }
    out.replace('\\', "/")
}

fn push_segment(out: &mut String, seg: &str) {
    if !out.is_empty() && !out.ends_with('/') {
        out.push('/');
    }
    out.push_str(seg);
}

/// Normalize a glob pattern the same way paths are normalized.
pub fn normalize_pattern(pattern: &str) -> String {
    normalize_path(Path::new(&pattern.replace('\\', "/")))
}

pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(GLOB_META)
}

/// Whether any segment from the first glob segment on starts with `.`.
///
/// Wildcards never match a leading dot on their own, so `**` and `*` skip
/// `.git/` or `.a.txt.swp`; writing the dot (`**/.env`, `.*`) opts in.
pub fn glob_names_hidden(pattern: &str) -> bool {
    pattern
        .split('/')
        .skip_while(|seg| !seg.contains(GLOB_META))
        .any(|seg| seg.starts_with('.'))
}

/// Split a normalized glob into the literal directory to start walking from
/// and the maximum walk depth below it.
///
/// `src/**/*.rs` gives `("src", None)`; `/p/*/x/*.txt` gives `("/p", Some(3))`.
pub fn glob_walk_root(pattern: &str) -> (PathBuf, Option<usize>) {
    let segments: Vec<&str> = pattern.split('/').collect();
    let literal = segments
        .iter()
        .position(|seg| seg.contains(GLOB_META))
        .unwrap_or(segments.len());

    let base = segments[..literal].join("/");
    let base = if base.is_empty() && pattern.starts_with('/') {
        PathBuf::from("/")
    } else if base.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(base)
    };

    let rest = &segments[literal..];
    let max_depth = if rest.iter().any(|seg| seg.contains("**")) {
        None
    } else {
        Some(rest.len())
    };

    (base, max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_cur_dir_and_duplicate_separators() {
        assert_eq!(normalize_path(Path::new("./src//a.rs")), "src/a.rs");
        assert_eq!(normalize_path(Path::new("/tmp/./x/a.txt")), "/tmp/x/a.txt");
        assert_eq!(normalize_path(Path::new("../up/a.txt")), "../up/a.txt");
        assert_eq!(normalize_path(Path::new(".")), ".");
    }

    #[test]
    fn normalize_pattern_converts_backslashes() {
        assert_eq!(normalize_pattern(r"dir\**\*.txt"), "dir/**/*.txt");
        assert_eq!(normalize_pattern("./*.txt"), "*.txt");
    }

    #[test]
    fn hidden_segments_only_count_after_the_walk_root() {
        assert!(!glob_names_hidden("/tmp/.tmpX/**"));
        assert!(!glob_names_hidden("src/**/*.rs"));
        assert!(glob_names_hidden("src/**/.env"));
        assert!(glob_names_hidden("/p/.*"));
    }

    #[test]
    fn walk_root_for_recursive_pattern() {
        assert_eq!(glob_walk_root("src/**/*.rs"), (PathBuf::from("src"), None));
    }

    #[test]
    fn walk_root_for_bounded_pattern() {
        assert_eq!(
            glob_walk_root("/p/*/x/*.txt"),
            (PathBuf::from("/p"), Some(3))
        );
        assert_eq!(glob_walk_root("*.txt"), (PathBuf::from("."), Some(1)));
        assert_eq!(glob_walk_root("/*.txt"), (PathBuf::from("/"), Some(1)));
    }
}
