// src/engine/dispatch.rs

//! Callback shapes and the per-registration dispatch adapter.
//!
//! A registration's [`DispatchStyle`] decides the payload shape once, at
//! registration time; its trigger mode has already decided (in the diff)
//! whether a delivery carries one change or a batch. The adapter only has to
//! combine the two and call the user's callback.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

use crate::types::{Change, DispatchStyle};
use crate::watch::diff::Delivery;

/// What a callback receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// `DispatchStyle::NoArgs`.
    Empty,
    /// `PerFile` with `DispatchStyle::WithChanges`.
    Change(Change),
    /// `AnyFile` with `DispatchStyle::WithChanges`, in discovery order.
    Batch(Vec<Change>),
}

impl Payload {
    /// All changes carried, whatever the shape.
    pub fn changes(&self) -> &[Change] {
        match self {
            Payload::Empty => &[],
            Payload::Change(change) => std::slice::from_ref(change),
            Payload::Batch(changes) => changes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes().is_empty()
    }

    /// Shape a delivery for a callback with the given dispatch style.
    pub fn from_delivery(style: DispatchStyle, delivery: Delivery) -> Self {
        match (style, delivery) {
            (DispatchStyle::NoArgs, _) => Payload::Empty,
            (DispatchStyle::WithChanges, Delivery::Change { change, .. }) => Payload::Change(change),
            (DispatchStyle::WithChanges, Delivery::Batch { changes, .. }) => Payload::Batch(changes),
        }
    }
}

/// Plain synchronous callback.
pub trait Callback {
    fn call(&mut self, payload: Payload) -> Result<()>;
}

impl<F> Callback for F
where
    F: FnMut(Payload) -> Result<()>,
{
    fn call(&mut self, payload: Payload) -> Result<()> {
        self(payload)
    }
}

pub type CallbackFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Callback whose invocation must be awaited.
pub trait AsyncCallback: Send {
    fn call(&mut self, payload: Payload) -> CallbackFuture<'_>;
}

impl<F, Fut> AsyncCallback for F
where
    F: FnMut(Payload) -> Fut + Send,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn call(&mut self, payload: Payload) -> CallbackFuture<'_> {
        Box::pin(self(payload))
    }
}

/// Callback accepted by the asynchronous engine.
///
/// Resolved once when registering: a `Blocking` handler runs inline without
/// suspending, an `Awaited` one is awaited to completion.
pub enum Handler {
    Blocking(Box<dyn Callback + Send>),
    Awaited(Box<dyn AsyncCallback>),
}

impl Handler {
    pub fn blocking(callback: impl Callback + Send + 'static) -> Self {
        Handler::Blocking(Box::new(callback))
    }

    pub fn awaited(callback: impl AsyncCallback + 'static) -> Self {
        Handler::Awaited(Box::new(callback))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Blocking(_) => f.write_str("Handler::Blocking"),
            Handler::Awaited(_) => f.write_str("Handler::Awaited"),
        }
    }
}

/// Dispatch adapter for the synchronous engine.
pub struct Dispatcher {
    style: DispatchStyle,
    callback: Box<dyn Callback>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(style: DispatchStyle, callback: Box<dyn Callback>) -> Self {
        Self { style, callback }
    }

    pub fn dispatch(&mut self, delivery: Delivery) -> Result<()> {
        self.callback.call(Payload::from_delivery(self.style, delivery))
    }
}

/// Dispatch adapter for the asynchronous engine.
#[derive(Debug)]
pub struct AsyncDispatcher {
    style: DispatchStyle,
    handler: Handler,
}

impl AsyncDispatcher {
    pub fn new(style: DispatchStyle, handler: Handler) -> Self {
        Self { style, handler }
    }

    pub async fn dispatch(&mut self, delivery: Delivery) -> Result<()> {
        let payload = Payload::from_delivery(self.style, delivery);
        match &mut self.handler {
            Handler::Blocking(callback) => callback.call(payload),
            Handler::Awaited(callback) => callback.call(payload).await,
        }
    }
}
