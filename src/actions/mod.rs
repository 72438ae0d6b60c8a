// src/actions/mod.rs

//! Actions that a watch entry runs when its callback fires.
//!
//! Actions are looked up by name in a static [`ActionRegistry`] built at
//! startup. Each entry's actions are composed into one
//! [`chain::ActionChain`], which is what gets registered with the engine.
//!
//! - [`notify`] prints one line per change.
//! - [`cmd`] runs a shell command per change and streams its output.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::engine::Payload;
use crate::errors::{Result, WatcherError};

pub mod chain;
pub mod cmd;
pub mod notify;

pub use chain::{ActionChain, ChainReport};

/// Keyword parameters for an action, e.g. `{ "cmd": "ffprobe {0}" }`.
pub type ActionParams = BTreeMap<String, String>;

pub type ActionFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// A configured action.
///
/// Implementations receive whatever payload the engine dispatched: one
/// change, a batch, or nothing at all.
pub trait Action: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
    fn run<'a>(&'a self, payload: &'a Payload) -> ActionFuture<'a>;
}

/// Builds an action from its parameters.
pub type ActionFactory = fn(&ActionParams) -> Result<Box<dyn Action>>;

/// An action reference from the config: a name plus optional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    pub name: String,
    pub params: ActionParams,
}

impl ActionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: ActionParams::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Human readable form, e.g. `notify` or `cmd:{"cmd": "cat {0}"}`.
    pub fn label(&self) -> String {
        if self.params.is_empty() {
            return self.name.clone();
        }
        let params: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{}: {}", json_str(k), json_str(v)))
            .collect();
        format!("{}:{{{}}}", self.name, params.join(", "))
    }
}

fn json_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Name -> factory lookup for actions.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    factories: BTreeMap<String, ActionFactory>,
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ActionRegistry {
    /// Registry with the built-in `notify` and `cmd` actions.
    pub fn builtin() -> Self {
        Self::default()
            .with("notify", notify::factory)
            .with("cmd", cmd::factory)
    }

    pub fn with(mut self, name: impl Into<String>, factory: ActionFactory) -> Self {
        self.factories.insert(name.into(), factory);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn build(&self, spec: &ActionSpec) -> Result<Box<dyn Action>> {
        let factory = self.factories.get(&spec.name).ok_or_else(|| {
            WatcherError::UnknownAction(format!(
                "'{}' (known actions: {})",
                spec.name,
                self.names().collect::<Vec<_>>().join(", ")
            ))
        })?;
        factory(&spec.params)
    }
}
