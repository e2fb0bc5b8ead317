use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use hostmsg_frame::{Envelope, Sentinel};
use hostmsg_transport::{ContextId, MessageEvent, TargetOrigin, Window};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::diagnostics::{DiagnosticsSink, TracingSink};
use crate::gateway::{self, GatewayStats, StatsCell};
use crate::registry::{CallbackRegistry, HandlerOutput, Unregister};

/// State shared between the client handle and its gateway subscription.
pub(crate) struct ClientState {
    pub(crate) host: Cell<ContextId>,
    pub(crate) sentinel: RefCell<Option<Sentinel>>,
    pub(crate) registry: CallbackRegistry,
    pub(crate) sink: Rc<dyn DiagnosticsSink>,
    pub(crate) config: ClientConfig,
    pub(crate) stats: StatsCell,
}

/// Messaging endpoint for a context embedded in a host.
///
/// Construction subscribes once to the owning context's inbound events and
/// targets the context's parent. The subscription stops dispatching once the
/// last strong handle to the client is dropped.
///
/// Handlers are owned by the client, so a handler that captures a clone of
/// the client keeps it alive for as long as that handler stays registered.
/// Handlers that need to call back into the client should capture a
/// [`WeakMessagingClient`] from [`downgrade`](Self::downgrade) instead.
#[derive(Clone)]
pub struct MessagingClient<W: Window> {
    window: W,
    state: Rc<ClientState>,
}

impl<W: Window> MessagingClient<W> {
    /// Create a client for `window` with default config.
    pub fn new(window: W) -> Self {
        Self::with_config(window, ClientConfig::default())
    }

    /// Create a client with explicit config.
    pub fn with_config(window: W, config: ClientConfig) -> Self {
        Self::with_sink(window, config, Rc::new(TracingSink))
    }

    /// Create a client with explicit config and diagnostics sink.
    pub fn with_sink(window: W, config: ClientConfig, sink: Rc<dyn DiagnosticsSink>) -> Self {
        let state = Rc::new(ClientState {
            host: Cell::new(window.parent()),
            sentinel: RefCell::new(None),
            registry: CallbackRegistry::new(),
            sink,
            config,
            stats: StatsCell::default(),
        });

        let subscription = Rc::downgrade(&state);
        window.listen(Box::new(move |event: &MessageEvent| {
            if let Some(state) = subscription.upgrade() {
                gateway::handle_event(&state, event);
            }
        }));

        Self { window, state }
    }

    /// Register `handler` for `response_type`, then send `request_type`.
    ///
    /// Responses are matched by type only; a second request for the same
    /// response type replaces the first handler.
    pub fn make_request<F, R>(
        &self,
        request_type: &str,
        response_type: &str,
        handler: F,
    ) -> Unregister
    where
        F: Fn(&Envelope) -> R + 'static,
        R: HandlerOutput,
    {
        let unregister = self.register_callback(response_type, handler);
        self.send_message(request_type, None);
        unregister
    }

    /// Register `handler` for messages of `message_type`.
    ///
    /// Only one handler exists per type; a later registration replaces this
    /// one silently.
    pub fn register_callback<F, R>(&self, message_type: &str, handler: F) -> Unregister
    where
        F: Fn(&Envelope) -> R + 'static,
        R: HandlerOutput,
    {
        self.state.registry.register(message_type, handler)
    }

    /// Post `{type, sentinel, ...payload}` to the host window.
    ///
    /// Payload fields are merged last and override `type` and `sentinel`.
    pub fn send_message(&self, message_type: &str, payload: Option<Map<String, Value>>) {
        let envelope = Envelope::outbound(message_type, self.state.sentinel.borrow().as_ref())
            .merge(payload.unwrap_or_default());
        self.post(message_type, envelope);
    }

    /// Serialize `payload` and send it like [`send_message`](Self::send_message).
    ///
    /// Fails only if `payload` does not serialize to a JSON object.
    pub fn send_typed<T: Serialize>(
        &self,
        message_type: &str,
        payload: &T,
    ) -> hostmsg_frame::Result<()> {
        let envelope = Envelope::outbound(message_type, self.state.sentinel.borrow().as_ref())
            .merge_typed(payload)?;
        self.post(message_type, envelope);
        Ok(())
    }

    /// Retarget sends and inbound source filtering to `host`.
    pub fn set_host_window(&self, host: ContextId) {
        tracing::debug!(host = %host, "host window changed");
        self.state.host.set(host);
    }

    /// Set the session sentinel. May be called again at any time.
    pub fn set_sentinel(&self, sentinel: impl Into<Sentinel>) {
        *self.state.sentinel.borrow_mut() = Some(sentinel.into());
    }

    /// Current sentinel, if set.
    pub fn sentinel(&self) -> Option<Sentinel> {
        self.state.sentinel.borrow().clone()
    }

    /// Current host window.
    pub fn host_window(&self) -> ContextId {
        self.state.host.get()
    }

    /// Check if a handler is registered for `message_type`.
    pub fn is_registered(&self, message_type: &str) -> bool {
        self.state.registry.contains(message_type)
    }

    /// Registered message types, sorted.
    pub fn registered_types(&self) -> Vec<String> {
        self.state.registry.message_types()
    }

    /// Gateway counters.
    pub fn stats(&self) -> GatewayStats {
        self.state.stats.snapshot()
    }

    /// The owning context.
    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn config(&self) -> &ClientConfig {
        &self.state.config
    }

    /// Non-owning handle to this client, for use inside handlers.
    pub fn downgrade(&self) -> WeakMessagingClient<W>
    where
        W: Clone,
    {
        WeakMessagingClient {
            window: self.window.clone(),
            state: Rc::downgrade(&self.state),
        }
    }

    fn post(&self, message_type: &str, envelope: Envelope) {
        let host = self.state.host.get();
        tracing::debug!(message_type, host = %host, "sending message");
        if let Err(err) = self
            .window
            .post_message(host, envelope.into_value(), &TargetOrigin::Any)
        {
            tracing::debug!(message_type, host = %host, error = %err, "post_message failed");
        }
    }
}

/// Handle that does not keep a [`MessagingClient`] alive.
#[derive(Clone)]
pub struct WeakMessagingClient<W: Window> {
    window: W,
    state: Weak<ClientState>,
}

impl<W: Window> WeakMessagingClient<W> {
    /// The client, unless every strong handle has been dropped.
    pub fn upgrade(&self) -> Option<MessagingClient<W>>
    where
        W: Clone,
    {
        self.state.upgrade().map(|state| MessagingClient {
            window: self.window.clone(),
            state,
        })
    }
}
