use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use hostmsg_frame::Envelope;

use crate::error::{BoxError, HandlerResult};

/// A registered handler.
pub(crate) type Callback = Rc<dyn Fn(&Envelope) -> HandlerResult>;

type CallbackMap = RefCell<HashMap<String, Callback>>;

/// Values a handler may return.
///
/// `()` always succeeds; `Err` from a `Result` is reported as a handler failure.
pub trait HandlerOutput {
    fn into_handler_result(self) -> HandlerResult;
}

impl HandlerOutput for () {
    fn into_handler_result(self) -> HandlerResult {
        Ok(())
    }
}

impl<E: Into<BoxError>> HandlerOutput for Result<(), E> {
    fn into_handler_result(self) -> HandlerResult {
        self.map_err(Into::into)
    }
}

/// Message-type keyed table of handlers, at most one per key.
///
/// Registering under an existing key replaces the previous handler. Keys are
/// not validated.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    callbacks: Rc<CallbackMap>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` for `message_type`, replacing any previous one.
    pub fn register<F, R>(&self, message_type: &str, handler: F) -> Unregister
    where
        F: Fn(&Envelope) -> R + 'static,
        R: HandlerOutput,
    {
        let callback: Callback =
            Rc::new(move |envelope: &Envelope| handler(envelope).into_handler_result());
        let replaced = self
            .callbacks
            .borrow_mut()
            .insert(message_type.to_string(), callback)
            .is_some();
        tracing::debug!(message_type, replaced, "callback registered");

        Unregister {
            callbacks: Rc::downgrade(&self.callbacks),
            message_type: message_type.to_string(),
        }
    }

    /// Remove whatever is registered under `message_type`.
    pub fn unregister(&self, message_type: &str) -> bool {
        remove(&self.callbacks, message_type)
    }

    pub(crate) fn lookup(&self, message_type: &str) -> Option<Callback> {
        self.callbacks.borrow().get(message_type).cloned()
    }

    /// Check if a handler is registered for `message_type`.
    pub fn contains(&self, message_type: &str) -> bool {
        self.callbacks.borrow().contains_key(message_type)
    }

    /// Registered message types, sorted.
    pub fn message_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.callbacks.borrow().keys().cloned().collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }
}

fn remove(callbacks: &CallbackMap, message_type: &str) -> bool {
    let removed = callbacks.borrow_mut().remove(message_type).is_some();
    tracing::debug!(message_type, removed, "callback unregistered");
    removed
}

/// Capability returned by registration.
///
/// Calling [`unregister`](Unregister::unregister) deletes whatever handler is
/// currently installed under the key, even if a later registration replaced
/// the one that produced this capability. Calling it again is a no-op.
#[derive(Debug, Clone)]
pub struct Unregister {
    callbacks: Weak<CallbackMap>,
    message_type: String,
}

impl Unregister {
    pub fn unregister(&self) {
        if let Some(callbacks) = self.callbacks.upgrade() {
            remove(&callbacks, &self.message_type);
        }
    }

    /// The key this capability removes.
    pub fn message_type(&self) -> &str {
        &self.message_type
    }
}
