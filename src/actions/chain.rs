// src/actions/chain.rs

use std::sync::Arc;

use tracing::{error, warn};

use crate::actions::{Action, ActionRegistry, ActionSpec};
use crate::engine::{Handler, Payload};
use crate::errors::Result;

/// The ordered actions of one watch entry, run over the same payload.
///
/// If an action fails, the failure is reported, the remaining actions are
/// skipped for this payload, and the chain still completes normally so the
/// engine moves on to the next delivery.
#[derive(Debug)]
pub struct ActionChain {
    actions: Vec<Box<dyn Action>>,
}

/// What happened during one [`ActionChain::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainReport {
    pub completed: Vec<String>,
    /// `(action name, error message)` of the action that failed.
    pub failed: Option<(String, String)>,
    pub skipped: Vec<String>,
}

impl ChainReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }
}

impl ActionChain {
    pub fn new(actions: Vec<Box<dyn Action>>) -> Self {
        Self { actions }
    }

    pub fn from_specs(registry: &ActionRegistry, specs: &[ActionSpec]) -> Result<Self> {
        let actions = specs
            .iter()
            .map(|spec| registry.build(spec))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(actions))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub async fn run(&self, payload: &Payload) -> ChainReport {
        let mut report = ChainReport::default();

        let mut actions = self.actions.iter();
        for action in actions.by_ref() {
            match action.run(payload).await {
                Ok(()) => report.completed.push(action.name().to_string()),
                Err(err) => {
                    error!("Error executing action \"{}\": {}", action.name(), err);
                    report.failed = Some((action.name().to_string(), err.to_string()));
                    break;
                }
            }
        }

        for skipped in actions {
            warn!("-- Skipping: {}", skipped.name());
            report.skipped.push(skipped.name().to_string());
        }

        report
    }

    /// Wrap the chain as an awaited engine handler.
    pub fn into_handler(self) -> Handler {
        let chain = Arc::new(self);
        Handler::awaited(move |payload: Payload| {
            let chain = Arc::clone(&chain);
            async move {
                chain.run(&payload).await;
                Ok::<(), anyhow::Error>(())
            }
        })
    }
}
