// src/actions/cmd.rs

//! `cmd` action: run a shell command for each change.
//!
//! The `cmd` parameter is a template where `{0}` stands for the changed path
//! and `{1}` for the event kind. The command runs through the platform shell;
//! its stdout and stderr are forwarded line by line as they arrive.
//!
//! With `sh` the values never become script text: `{0}` and `{1}` are
//! rewritten to `"$1"` and `"$2"` and the values are passed as positional
//! arguments, so a file named `a b.txt` or `x;rm -rf y` stays one argument.

use std::io;
use std::process::Stdio;

use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::actions::{Action, ActionFuture, ActionParams};
use crate::engine::Payload;
use crate::errors::{Result, WatcherError};
use crate::types::Change;

const HEADER: &str = "[cmd]";

/// Exit status POSIX shells use for "command not found".
const SHELL_NOT_FOUND: i32 = 127;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdAction {
    template: String,
}

pub fn factory(params: &ActionParams) -> Result<Box<dyn Action>> {
    Ok(Box::new(CmdAction::from_params(params)?))
}

impl CmdAction {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn from_params(params: &ActionParams) -> Result<Self> {
        match params.get("cmd").map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(template) => Ok(Self::new(template)),
            None => Err(WatcherError::ConfigError(
                "Cmd is not defined properly".to_string(),
            )),
        }
    }

    /// The command line for one change, as shown to the user.
    pub fn command_line(&self, change: &Change) -> String {
        self.template
            .replace("{0}", &change.path)
            .replace("{1}", change.kind.as_str())
    }

    /// Run the command for one change and wait for it to exit.
    pub async fn run_change(&self, change: &Change) -> Result<()> {
        let line = self.command_line(change);
        println!("{} {}", HEADER.bright_cyan().bold(), line);
        info!(path = %change.path, kind = %change.kind, cmd = %line, "running command");

        let mut cmd = self.shell_command(change);
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| spawn_error(&line, e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (_, _, status) = tokio::join!(
            forward_lines(stdout, false),
            forward_lines(stderr, true),
            child.wait()
        );
        let status = status.map_err(|e| WatcherError::CommandExecution(e.to_string()))?;

        debug!(cmd = %line, ?status, "command exited");

        match status.code() {
            Some(0) => Ok(()),
            Some(SHELL_NOT_FOUND) if cfg!(unix) => Err(WatcherError::CommandNotFound(line)),
            Some(code) => Err(WatcherError::CommandFailed(code)),
            None => Err(WatcherError::CommandExecution(format!(
                "'{line}' was terminated by a signal"
            ))),
        }
    }
}

impl Action for CmdAction {
    fn name(&self) -> &str {
        "cmd"
    }

    fn run<'a>(&'a self, payload: &'a Payload) -> ActionFuture<'a> {
        Box::pin(async move {
            for change in payload.changes() {
                self.run_change(change).await?;
            }
            Ok(())
        })
    }
}

impl CmdAction {
    /// Script handed to `sh -c`: placeholders become positional parameters.
    #[cfg(not(windows))]
    pub fn script(&self) -> String {
        self.template.replace("{0}", "\"$1\"").replace("{1}", "\"$2\"")
    }

    #[cfg(not(windows))]
    fn shell_command(&self, change: &Change) -> Command {
        let mut c = Command::new("sh");
        c.arg("-c")
            .arg(self.script())
            .arg("watcher-fs")
            .arg(&change.path)
            .arg(change.kind.as_str());
        c
    }

    /// `cmd.exe` has no positional parameters; the path is double-quoted
    /// instead (Windows file names cannot contain `"`).
    #[cfg(windows)]
    fn shell_command(&self, change: &Change) -> Command {
        let line = self
            .template
            .replace("{0}", &format!("\"{}\"", change.path.replace('"', "")))
            .replace("{1}", change.kind.as_str());
        let mut c = Command::new("cmd");
        c.arg("/C").raw_arg(line);
        c
    }
}

fn spawn_error(line: &str, err: io::Error) -> WatcherError {
    if err.kind() == io::ErrorKind::NotFound {
        WatcherError::CommandNotFound(line.to_string())
    } else {
        WatcherError::CommandExecution(err.to_string())
    }
}

async fn forward_lines<R>(stream: Option<R>, to_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return;
    };
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if to_stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}
