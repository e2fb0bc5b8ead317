/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame text does not start with the expected prefix.
    #[error("frame does not start with prefix {prefix:?}")]
    MissingPrefix { prefix: String },

    /// The frame body (or a typed payload) is not valid JSON for its target.
    #[error("frame JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame body decoded to something other than a JSON object.
    #[error("frame body is not a JSON object (found {found})")]
    NotAnObject { found: &'static str },
}

pub type Result<T> = std::result::Result<T, FrameError>;
