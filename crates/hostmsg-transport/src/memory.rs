//! In-memory transport.
//!
//! A [`MessageBus`] owns a set of contexts arranged in a parent/child tree and
//! a queue of posted events. Nothing is delivered until [`MessageBus::pump`]
//! (or [`MessageBus::step`]) runs, which models the host's event loop turn.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use serde_json::Value;

use crate::error::{Result, TransportError};
use crate::traits::{ContextId, Listener, MessageEvent, TargetOrigin, Window};

type SharedListener = Rc<RefCell<Listener>>;

struct ContextSlot {
    parent: ContextId,
    origin: String,
    closed: bool,
    listeners: Vec<SharedListener>,
}

struct Pending {
    target: ContextId,
    event: MessageEvent,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    contexts: HashMap<ContextId, ContextSlot>,
    queue: VecDeque<Pending>,
}

impl BusInner {
    fn open(&mut self, parent: Option<ContextId>, origin: &str) -> ContextId {
        self.next_id += 1;
        let id = ContextId(self.next_id);
        self.contexts.insert(
            id,
            ContextSlot {
                parent: parent.unwrap_or(id),
                origin: origin.to_string(),
                closed: false,
                listeners: Vec::new(),
            },
        );
        id
    }
}

/// Single-threaded in-memory message bus.
#[derive(Clone, Default)]
pub struct MessageBus {
    inner: Rc<RefCell<BusInner>>,
}

impl MessageBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a top-level context (its own parent).
    pub fn open_top(&self, origin: &str) -> MemoryWindow {
        let id = self.inner.borrow_mut().open(None, origin);
        self.handle(id)
    }

    /// Open a context embedded in `parent`.
    pub fn open_child(&self, parent: ContextId, origin: &str) -> MemoryWindow {
        let id = self.inner.borrow_mut().open(Some(parent), origin);
        self.handle(id)
    }

    /// Look up an open context by identity.
    pub fn window(&self, id: ContextId) -> Option<MemoryWindow> {
        let inner = self.inner.borrow();
        match inner.contexts.get(&id) {
            Some(slot) if !slot.closed => Some(self.handle(id)),
            _ => None,
        }
    }

    /// Number of events waiting for delivery.
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Deliver the next queued event. Returns false when the queue is empty.
    ///
    /// Must not be called from inside a listener.
    pub fn step(&self) -> bool {
        let (target, event, listeners) = {
            let mut inner = self.inner.borrow_mut();
            let Some(Pending { target, event }) = inner.queue.pop_front() else {
                return false;
            };
            let listeners = match inner.contexts.get(&target) {
                Some(slot) if !slot.closed => slot.listeners.clone(),
                _ => Vec::new(),
            };
            (target, event, listeners)
        };

        tracing::trace!(
            source = %event.source,
            destination = %target,
            listeners = listeners.len(),
            "delivering message event"
        );

        for listener in listeners {
            match listener.try_borrow_mut() {
                Ok(mut listener) => {
                    let deliver: &mut Listener = &mut listener;
                    deliver(&event);
                }
                Err(_) => {
                    tracing::warn!(destination = %target, "listener re-entered during delivery; skipped")
                }
            }
        }
        true
    }

    /// Deliver queued events until the queue is empty, including events
    /// posted by listeners along the way. Returns the number delivered.
    pub fn pump(&self) -> usize {
        let mut delivered = 0usize;
        while self.step() {
            delivered = delivered.saturating_add(1);
        }
        delivered
    }

    fn handle(&self, id: ContextId) -> MemoryWindow {
        MemoryWindow {
            id,
            inner: self.inner.clone(),
        }
    }
}

/// A context living on a [`MessageBus`].
#[derive(Clone)]
pub struct MemoryWindow {
    id: ContextId,
    inner: Rc<RefCell<BusInner>>,
}

impl MemoryWindow {
    /// Origin this context reports on the messages it posts.
    pub fn origin(&self) -> String {
        self.inner
            .borrow()
            .contexts
            .get(&self.id)
            .map(|slot| slot.origin.clone())
            .unwrap_or_default()
    }

    /// Close the context. Queued and future messages to it are discarded.
    pub fn close(&self) {
        if let Some(slot) = self.inner.borrow_mut().contexts.get_mut(&self.id) {
            slot.closed = true;
            slot.listeners.clear();
        }
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner
            .borrow()
            .contexts
            .get(&self.id)
            .map(|slot| slot.closed)
            .unwrap_or(true)
    }
}

impl Window for MemoryWindow {
    fn id(&self) -> ContextId {
        self.id
    }

    fn parent(&self) -> ContextId {
        self.inner
            .borrow()
            .contexts
            .get(&self.id)
            .map(|slot| slot.parent)
            .unwrap_or(self.id)
    }

    fn listen(&self, listener: Listener) {
        if let Some(slot) = self.inner.borrow_mut().contexts.get_mut(&self.id) {
            slot.listeners.push(Rc::new(RefCell::new(listener)));
        }
    }

    fn post_message(
        &self,
        target: ContextId,
        data: Value,
        target_origin: &TargetOrigin,
    ) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        let origin = inner
            .contexts
            .get(&self.id)
            .map(|slot| slot.origin.clone())
            .unwrap_or_default();

        let slot = inner
            .contexts
            .get(&target)
            .ok_or(TransportError::UnknownContext(target))?;
        if slot.closed {
            return Err(TransportError::Closed(target));
        }
        if !target_origin.allows(&slot.origin) {
            tracing::debug!(
                destination = %target,
                expected = %target_origin,
                actual = %slot.origin,
                "target origin mismatch; message dropped"
            );
            return Ok(());
        }

        inner.queue.push_back(Pending {
            target,
            event: MessageEvent {
                source: self.id,
                origin,
                data,
            },
        });
        Ok(())
    }
}

impl std::fmt::Debug for MemoryWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryWindow").field("id", &self.id).finish()
    }
}
