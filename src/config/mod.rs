// src/config/mod.rs

//! Configuration loading and validation for watcher-fs.
//!
//! Responsibilities:
//! - Define the serde-backed data model (`model.rs`).
//! - Load a config file from disk as JSON or TOML (`loader.rs`).
//! - Validate entries into engine-ready values (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, parse_str, ConfigFormat};
pub use model::{ConfigFile, RawAction, RawConfigFile, RawPath, RawWatchEntry, WatchEntry};
