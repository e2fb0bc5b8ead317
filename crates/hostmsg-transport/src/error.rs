use crate::traits::ContextId;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No context with this identity is known to the transport.
    #[error("unknown context {0}")]
    UnknownContext(ContextId),

    /// The target context has been closed.
    #[error("context {0} is closed")]
    Closed(ContextId),
}

pub type Result<T> = std::result::Result<T, TransportError>;
