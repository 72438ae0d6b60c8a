// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `watcher-fs`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "watcher-fs",
    version,
    about = "Poll files for changes and run actions on them.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (JSON, or TOML when it ends in `.toml`).
    #[arg(long, value_name = "PATH", default_value = "watcher-fs.cfg")]
    pub config: PathBuf,

    /// Milliseconds to sleep between check cycles.
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub interval: u64,

    /// Run a single check cycle and exit.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WATCHER_FS_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate the config and print the watch entries, but don't watch.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.interval.max(1))
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
