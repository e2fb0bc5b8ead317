//! Prefix-framed JSON envelopes and sentinel matching.
//!
//! Inbound frames are strings of the form `amp-<JSON object>`. Outbound
//! messages are native envelope objects `{type, sentinel, ...payload}` handed
//! to the transport as-is. This crate owns both shapes plus the loose
//! sentinel comparison used to correlate frames with a session.

pub mod codec;
pub mod coerce;
pub mod envelope;
pub mod error;
pub mod sentinel;

pub use codec::{decode_frame, encode_frame, frame_text, FRAME_PREFIX};
pub use envelope::{Envelope, SENTINEL_FIELD, TYPE_FIELD};
pub use error::{FrameError, Result};
pub use sentinel::{Sentinel, SentinelMatch};
