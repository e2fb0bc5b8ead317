use std::fmt;

use serde_json::Value;

use crate::error::Result;

/// Identity of a messaging context (a window or frame).
///
/// Two references to the same context compare equal. This is what inbound
/// events report as their `source` and what outbound sends target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

/// Origin restriction applied when posting a message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TargetOrigin {
    /// Deliver regardless of the target's origin (`"*"`).
    #[default]
    Any,
    /// Deliver only if the target's origin matches exactly.
    Exact(String),
}

impl TargetOrigin {
    /// Parse the wire form: `"*"` is the wildcard, anything else is exact.
    pub fn parse(value: &str) -> Self {
        if value == "*" {
            Self::Any
        } else {
            Self::Exact(value.to_string())
        }
    }

    /// Returns true if a context with `origin` may receive the message.
    pub fn allows(&self, origin: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => expected == origin,
        }
    }
}

impl fmt::Display for TargetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Exact(origin) => f.write_str(origin),
        }
    }
}

/// One inbound event delivered to a context's listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    /// The context that posted the message.
    pub source: ContextId,
    /// Origin of the posting context.
    pub origin: String,
    /// The posted value, as passed to `post_message`.
    pub data: Value,
}

/// Callback receiving inbound events.
pub type Listener = Box<dyn FnMut(&MessageEvent)>;

/// A messaging context as exposed by the host runtime.
///
/// Implementations are single-threaded: listeners run on the context's event
/// turn and may call back into the transport.
pub trait Window {
    /// Identity of this context.
    fn id(&self) -> ContextId;

    /// The embedding context. A top-level context is its own parent.
    fn parent(&self) -> ContextId;

    /// Subscribe to every message event delivered to this context.
    ///
    /// The subscription lasts as long as the context.
    fn listen(&self, listener: Listener);

    /// Post `data` to `target`, restricted by `target_origin`.
    ///
    /// Delivery is asynchronous; `Ok` only means the message was accepted.
    fn post_message(&self, target: ContextId, data: Value, target_origin: &TargetOrigin)
        -> Result<()>;
}
