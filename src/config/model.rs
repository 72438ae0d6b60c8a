// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::actions::ActionSpec;
use crate::types::TriggerMode;
use crate::watch::patterns::PatternSource;

/// Top-level configuration as read from disk.
///
/// JSON configs may be a single entry, a list of entries, or an object with a
/// `watch` list:
///
/// ```json
/// [
///   {
///     "path": "assets/**/*.styl",
///     "trigger_type": "any_file",
///     "actions": ["notify", { "action": "cmd", "cmd": "stylus {0}" }]
///   }
/// ]
/// ```
///
/// TOML configs use an array of tables:
///
/// ```toml
/// [[watch]]
/// path = "assets/**/*.styl"
/// trigger_type = "any_file"
/// actions = ["notify", { action = "cmd", cmd = "stylus {0}" }]
/// ```
///
/// Entries are kept as untyped values here and decoded one by one during
/// validation, so a malformed field is reported against its entry index.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawConfigFile {
    Sections { watch: Vec<serde_json::Value> },
    List(Vec<serde_json::Value>),
    Single(serde_json::Value),
}

impl RawConfigFile {
    pub fn into_entries(self) -> Vec<serde_json::Value> {
        match self {
            RawConfigFile::Sections { watch } => watch,
            RawConfigFile::List(entries) => entries,
            RawConfigFile::Single(entry) => vec![entry],
        }
    }
}

/// One unvalidated watch entry.
///
/// Every field is optional at this stage so that validation, not the
/// deserializer, reports what is missing along with the entry index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawWatchEntry {
    #[serde(default)]
    pub path: Option<RawPath>,

    /// `"per_file"` (default) or `"any_file"`.
    #[serde(default)]
    pub trigger_type: Option<String>,

    #[serde(default)]
    pub actions: Vec<RawAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawPath {
    Pattern(String),
    Paths(Vec<String>),
}

/// `"notify"` or `{ "action": "cmd", "cmd": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawAction {
    Name(String),
    Table(BTreeMap<String, String>),
}

/// Validated configuration. Only constructible through validation.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    entries: Vec<WatchEntry>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(entries: Vec<WatchEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[WatchEntry] {
        &self.entries
    }
}

/// A validated watch entry: one `register()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEntry {
    pub source: PatternSource,
    pub trigger: TriggerMode,
    pub actions: Vec<ActionSpec>,
}

impl WatchEntry {
    /// e.g. `test_dir/** (any_file) - Actions: notify, cmd:{"cmd": "cat {0}"}`
    pub fn describe(&self) -> String {
        let actions: Vec<String> = self.actions.iter().map(ActionSpec::label).collect();
        format!(
            "{} ({}) - Actions: {}",
            self.source,
            self.trigger,
            actions.join(", ")
        )
    }
}
