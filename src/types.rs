use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Stable index assigned to a registration at `register` time.
///
/// Registrations are append-only, so the index doubles as the position of the
/// registration inside the engine.
pub type RegistrationId = usize;

/// How often a registration's callback fires within one check cycle.
///
/// - `PerFile`: once per changed file (default).
/// - `AnyFile`: at most once per cycle, with all changes aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    #[default]
    PerFile,
    AnyFile,
}

impl TriggerMode {
    /// Accepted spellings, in the order they are reported in errors.
    pub const NAMES: [&'static str; 2] = ["per_file", "any_file"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerMode::PerFile => "per_file",
            TriggerMode::AnyFile => "any_file",
        }
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per_file" => Ok(TriggerMode::PerFile),
            "any_file" => Ok(TriggerMode::AnyFile),
            other => Err(format!(
                "invalid trigger_type '{other}' (expected one of {:?})",
                TriggerMode::NAMES
            )),
        }
    }
}

/// Whether a callback receives the change data or is called bare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DispatchStyle {
    /// Call with no arguments, however many changes occurred.
    #[default]
    NoArgs,
    /// Pass a single change (`PerFile`) or the ordered batch (`AnyFile`).
    WithChanges,
}

impl From<bool> for DispatchStyle {
    fn from(with_changes: bool) -> Self {
        if with_changes {
            DispatchStyle::WithChanges
        } else {
            DispatchStyle::NoArgs
        }
    }
}

/// Classification of a detected change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Added,
    Modified,
    Deleted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Added => "added",
            EventKind::Modified => "modified",
            EventKind::Deleted => "deleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `(path, kind)` change record.
///
/// `path` is always normalized to forward slashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Change {
    pub path: String,
    pub kind: EventKind,
}

impl Change {
    pub fn new(path: impl Into<String>, kind: EventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_mode_parses_known_names() {
        assert_eq!("per_file".parse::<TriggerMode>(), Ok(TriggerMode::PerFile));
        assert_eq!(" ANY_FILE ".parse::<TriggerMode>(), Ok(TriggerMode::AnyFile));
    }

    #[test]
    fn trigger_mode_rejects_unknown_names() {
        let err = "sometimes".parse::<TriggerMode>().unwrap_err();
        assert!(err.contains("'sometimes'"));
        assert!(err.contains("per_file"));
        assert!(err.contains("any_file"));
    }

    #[test]
    fn dispatch_style_from_bool() {
        assert_eq!(DispatchStyle::from(true), DispatchStyle::WithChanges);
        assert_eq!(DispatchStyle::from(false), DispatchStyle::NoArgs);
        assert_eq!(DispatchStyle::default(), DispatchStyle::NoArgs);
    }
}
