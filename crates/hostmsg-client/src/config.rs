use hostmsg_frame::{SentinelMatch, FRAME_PREFIX};

/// Tag attached to handler-failure diagnostics.
pub const DEFAULT_DIAGNOSTIC_TAG: &str = "IFRAME-MSG";

/// Controls client framing and matching behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Literal prefix that marks inbound frames. Default: `"amp-"`.
    pub prefix: String,
    /// Tag passed to the diagnostics sink on handler failure.
    pub diagnostic_tag: String,
    /// Sentinel comparison mode. Default: loose.
    pub sentinel_match: SentinelMatch,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            prefix: FRAME_PREFIX.to_string(),
            diagnostic_tag: DEFAULT_DIAGNOSTIC_TAG.to_string(),
            sentinel_match: SentinelMatch::Loose,
        }
    }
}
