// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::fmt;

use thiserror::Error;

use crate::types::RegistrationId;

#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Command failed with exit code {0}")]
    CommandFailed(i32),

    #[error("Command execution failed: {0}")]
    CommandExecution(String),

    #[error("{} callback(s) failed during check: {}", .0.len(), FailureList(.0))]
    Dispatch(Vec<DispatchFailure>),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One callback that returned an error during a check cycle.
#[derive(Debug)]
pub struct DispatchFailure {
    pub registration: RegistrationId,
    pub error: anyhow::Error,
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registration #{}: {:#}", self.registration, self.error)
    }
}

struct FailureList<'a>(&'a [DispatchFailure]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WatcherError>;
