//! Cross-context messaging transport abstraction.
//!
//! Models the host runtime's cross-context messaging primitive: every context
//! (window) has an identity, a parent, one inbound event stream, and a
//! `post_message` operation that delivers a native value to another context.
//!
//! This is the lowest layer of hostmsg. Everything else builds on top of the
//! [`Window`] trait provided here. [`MessageBus`] is an in-memory
//! implementation used by tests, demos and the CLI.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, TransportError};
pub use memory::{MemoryWindow, MessageBus};
pub use traits::{ContextId, Listener, MessageEvent, TargetOrigin, Window};
