// src/config/validate.rs

use crate::actions::ActionSpec;
use crate::config::model::{ConfigFile, RawAction, RawConfigFile, RawPath, RawWatchEntry, WatchEntry};
use crate::errors::{Result, WatcherError};
use crate::types::TriggerMode;
use crate::watch::patterns::{PatternMatcher, PatternSource};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WatcherError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let raw_entries = raw.into_entries();
        if raw_entries.is_empty() {
            return Err(WatcherError::ConfigError(
                "config must contain at least one watch entry".to_string(),
            ));
        }

        let entries = raw_entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| validate_entry(index, entry))
            .collect::<Result<Vec<_>>>()?;

        Ok(ConfigFile::new_unchecked(entries))
    }
}

fn validate_entry(index: usize, value: serde_json::Value) -> Result<WatchEntry> {
    let raw: RawWatchEntry = serde_json::from_value(value).map_err(|e| {
        WatcherError::ConfigError(format!("invalid watch entry #{index}: {e}"))
    })?;

    let source = validate_path(index, raw.path)?;
    let trigger = validate_trigger(index, raw.trigger_type.as_deref())?;
    let actions = raw
        .actions
        .into_iter()
        .map(|action| validate_action(index, action))
        .collect::<Result<Vec<_>>>()?;

    Ok(WatchEntry {
        source,
        trigger,
        actions,
    })
}

fn validate_path(index: usize, path: Option<RawPath>) -> Result<PatternSource> {
    let source = match path {
        Some(RawPath::Pattern(pattern)) if !pattern.trim().is_empty() => PatternSource::Glob(pattern),
        Some(RawPath::Paths(paths)) if !paths.is_empty() => PatternSource::from(paths),
        _ => {
            return Err(WatcherError::ConfigError(format!(
                "missing path in watch entry #{index}"
            )));
        }
    };

    // Compile once here so a bad glob is reported against its entry.
    PatternMatcher::compile(source.clone())
        .map_err(|e| WatcherError::ConfigError(format!("watch entry #{index}: {e}")))?;

    Ok(source)
}

fn validate_trigger(index: usize, trigger: Option<&str>) -> Result<TriggerMode> {
    match trigger {
        None => Ok(TriggerMode::default()),
        Some(s) => s.parse::<TriggerMode>().map_err(|_| {
            WatcherError::ConfigError(format!(
                "invalid trigger_type '{s}' in watch entry #{index} (expected one of {:?})",
                TriggerMode::NAMES
            ))
        }),
    }
}

fn validate_action(index: usize, action: RawAction) -> Result<ActionSpec> {
    match action {
        RawAction::Name(name) if !name.trim().is_empty() => Ok(ActionSpec::new(name.trim())),
        RawAction::Table(mut table) => match table.remove("action") {
            Some(name) if !name.trim().is_empty() => Ok(ActionSpec {
                name: name.trim().to_string(),
                params: table,
            }),
            _ => Err(invalid_action(index, &format!("{table:?}"))),
        },
        RawAction::Name(name) => Err(invalid_action(index, &format!("{name:?}"))),
    }
}

fn invalid_action(index: usize, found: &str) -> WatcherError {
    WatcherError::ConfigError(format!(
        "invalid action format in watch entry #{index}: \
         must be a string or a table with an 'action' key (got {found})"
    ))
}
