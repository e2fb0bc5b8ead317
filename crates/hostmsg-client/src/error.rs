/// Error type handlers may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What a handler invocation produced, as seen by the gateway.
pub type HandlerResult = std::result::Result<(), BoxError>;

/// A registered handler failed while processing a message.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The handler returned an error.
    #[error("{0}")]
    Failed(BoxError),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}
