//! Request/response messaging between an embedded context and its host.
//!
//! hostmsg multiplexes typed requests and responses over a single untyped
//! cross-context channel: prefix-framed JSON inbound, native envelope objects
//! outbound, one callback per message type, correlated by a session sentinel.
//!
//! # Crate Structure
//!
//! - [`transport`]: Context abstraction and the in-memory message bus
//! - [`frame`]: Frame codec, envelopes and sentinel matching
//! - [`client`]: Callback registry, gateway and sender (behind `client` feature)

/// Re-export transport types.
pub mod transport {
    pub use hostmsg_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use hostmsg_frame::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use hostmsg_client::*;
}
