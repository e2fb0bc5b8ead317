//! Request/response messaging client for an embedded context.
//!
//! This is the "just works" layer. Register callbacks by message type, send
//! requests to the host context, and let one gateway subscription route
//! every inbound frame to the right callback.

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod gateway;
pub mod registry;

pub use client::{MessagingClient, WeakMessagingClient};
pub use config::{ClientConfig, DEFAULT_DIAGNOSTIC_TAG};
pub use diagnostics::{
    DiagnosticReport, DiagnosticsSink, RecordingSink, TracingSink, DIAGNOSTICS_TARGET,
};
pub use error::{BoxError, HandlerError, HandlerResult};
pub use gateway::{Disposition, DropReason, GatewayStats};
pub use registry::{CallbackRegistry, HandlerOutput, Unregister};
