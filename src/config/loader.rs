// src/config/loader.rs

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, WatcherError};

/// On-disk config syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// `.toml` files are TOML; anything else (`.json`, `.cfg`, ...) is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Parse config text without validating it.
pub fn parse_str(contents: &str, format: ConfigFormat) -> Result<RawConfigFile> {
    let config = match format {
        ConfigFormat::Json => serde_json::from_str(contents)?,
        ConfigFormat::Toml => toml::from_str(contents)?,
    };
    Ok(config)
}

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(WatcherError::ConfigError(format!(
                "Configuration file {} not found",
                path.display()
            )));
        }
        Err(err) => return Err(err.into()),
    };

    parse_str(&contents, ConfigFormat::from_path(path))
}

/// Load a configuration file from path and validate every entry.
///
/// This is the recommended entry point for the rest of the application.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Default config location: `watcher-fs.cfg` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("watcher-fs.cfg")
}
