//! Inbound routing.
//!
//! One subscription receives every event posted to the owning context. Each
//! event passes through the filter chain below and the first failing stage
//! drops it silently. Only a handler failure is reported.
//!
//! ```text
//! source == host ─► prefixed text ─► JSON object ─► sentinel match ─► handler ─► isolated call
//! ```

use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};

use hostmsg_frame::{decode_frame, frame_text, Envelope, FrameError};
use hostmsg_transport::MessageEvent;
use serde::Serialize;

use crate::client::ClientState;
use crate::error::HandlerError;
use crate::registry::Callback;

/// Why an inbound event was not dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Posted by a context other than the current host.
    ForeignSource,
    /// Data is not text starting with the frame prefix.
    NotFramed,
    /// Body is not a JSON object.
    Malformed,
    /// No sentinel configured, none in the frame, or they differ.
    SentinelMismatch,
    /// No handler registered for the frame's type.
    NoHandler,
}

/// Result of processing one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Dispatched,
    HandlerFailed,
    Dropped(DropReason),
}

/// Counters over every event the gateway has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GatewayStats {
    pub received: u64,
    pub dispatched: u64,
    pub handler_failures: u64,
    pub dropped_foreign_source: u64,
    pub dropped_not_framed: u64,
    pub dropped_malformed: u64,
    pub dropped_sentinel_mismatch: u64,
    pub dropped_no_handler: u64,
}

impl GatewayStats {
    /// Total events dropped for any reason.
    pub fn dropped(&self) -> u64 {
        self.dropped_foreign_source
            + self.dropped_not_framed
            + self.dropped_malformed
            + self.dropped_sentinel_mismatch
            + self.dropped_no_handler
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatsCell(Cell<GatewayStats>);

impl StatsCell {
    pub(crate) fn snapshot(&self) -> GatewayStats {
        self.0.get()
    }

    fn record(&self, disposition: Disposition) {
        let mut stats = self.0.get();
        stats.received += 1;
        match disposition {
            Disposition::Dispatched => stats.dispatched += 1,
            Disposition::HandlerFailed => stats.handler_failures += 1,
            Disposition::Dropped(DropReason::ForeignSource) => stats.dropped_foreign_source += 1,
            Disposition::Dropped(DropReason::NotFramed) => stats.dropped_not_framed += 1,
            Disposition::Dropped(DropReason::Malformed) => stats.dropped_malformed += 1,
            Disposition::Dropped(DropReason::SentinelMismatch) => {
                stats.dropped_sentinel_mismatch += 1
            }
            Disposition::Dropped(DropReason::NoHandler) => stats.dropped_no_handler += 1,
        }
        self.0.set(stats);
    }
}

/// Run one inbound event through the filter chain and dispatch it.
pub(crate) fn handle_event(state: &ClientState, event: &MessageEvent) -> Disposition {
    let disposition = match accept(state, event) {
        Ok((message_type, envelope, callback)) => {
            match invoke_isolated(&callback, &envelope) {
                Ok(()) => Disposition::Dispatched,
                Err(err) => {
                    let message = format!("error in registered callback {message_type}");
                    state
                        .sink
                        .report(&state.config.diagnostic_tag, &message, &err);
                    Disposition::HandlerFailed
                }
            }
        }
        Err(reason) => Disposition::Dropped(reason),
    };
    state.stats.record(disposition);
    disposition
}

fn accept(
    state: &ClientState,
    event: &MessageEvent,
) -> Result<(String, Envelope, Callback), DropReason> {
    if event.source != state.host.get() {
        return Err(DropReason::ForeignSource);
    }

    let text = frame_text(&event.data).ok_or(DropReason::NotFramed)?;
    let envelope = decode_frame(text, &state.config.prefix).map_err(|err| match err {
        FrameError::MissingPrefix { .. } => DropReason::NotFramed,
        FrameError::Json(_) | FrameError::NotAnObject { .. } => DropReason::Malformed,
    })?;

    let sentinel_ok = match (state.sentinel.borrow().as_ref(), envelope.sentinel()) {
        (Some(expected), Some(actual)) => expected.matches(actual, state.config.sentinel_match),
        _ => false,
    };
    if !sentinel_ok {
        return Err(DropReason::SentinelMismatch);
    }

    let message_type = envelope
        .message_type()
        .ok_or(DropReason::NoHandler)?
        .to_string();
    let callback = state
        .registry
        .lookup(&message_type)
        .ok_or(DropReason::NoHandler)?;
    Ok((message_type, envelope, callback))
}

/// Call `callback`, converting error returns and panics into [`HandlerError`].
fn invoke_isolated(callback: &Callback, envelope: &Envelope) -> Result<(), HandlerError> {
    match catch_unwind(AssertUnwindSafe(|| callback(envelope))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(HandlerError::Failed(err)),
        Err(payload) => Err(HandlerError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
