// src/actions/notify.rs

use owo_colors::OwoColorize;

use crate::actions::{Action, ActionFuture, ActionParams};
use crate::engine::Payload;
use crate::errors::Result;
use crate::types::Change;

const HEADER: &str = "[notify]";

/// Prints `[notify] File <path> has been <kind>` for every change.
#[derive(Debug, Clone, Default)]
pub struct NotifyAction;

pub fn factory(_params: &ActionParams) -> Result<Box<dyn Action>> {
    Ok(Box::new(NotifyAction))
}

pub fn render(change: &Change) -> String {
    format!(
        "{} File {} has been {}",
        HEADER.green().bold(),
        change.path,
        change.kind
    )
}

impl Action for NotifyAction {
    fn name(&self) -> &str {
        "notify"
    }

    fn run<'a>(&'a self, payload: &'a Payload) -> ActionFuture<'a> {
        Box::pin(async move {
            for change in payload.changes() {
                println!("{}", render(change));
            }
            Ok(())
        })
    }
}
