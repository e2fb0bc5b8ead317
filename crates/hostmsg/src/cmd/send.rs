use std::cell::RefCell;
use std::rc::Rc;

use hostmsg_client::MessagingClient;
use hostmsg_transport::{MessageBus, MessageEvent, Window};
use serde_json::Value;

use crate::cmd::{parse_payload, SendArgs, FRAME_ORIGIN, HOST_ORIGIN};
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let posted = capture_send(&args)?;
    if posted.is_empty() {
        return Err(CliError::new(INTERNAL, "host received nothing"));
    }
    for message in &posted {
        print_message("sent", message, format);
    }
    Ok(SUCCESS)
}

/// Send one message from an embedded client and return what its host received.
fn capture_send(args: &SendArgs) -> CliResult<Vec<Value>> {
    let payload = parse_payload(args.json.as_deref())?;

    let bus = MessageBus::new();
    let host = bus.open_top(HOST_ORIGIN);
    let frame = bus.open_child(host.id(), FRAME_ORIGIN);

    let posted = Rc::new(RefCell::new(Vec::new()));
    let sink = posted.clone();
    host.listen(Box::new(move |event: &MessageEvent| {
        sink.borrow_mut().push(event.data.clone());
    }));

    let client = MessagingClient::new(frame);
    if let Some(sentinel) = args.sentinel.as_deref() {
        client.set_sentinel(sentinel);
    }
    client.send_message(&args.message_type, payload);
    let delivered = bus.pump();
    tracing::debug!(delivered, "send delivered");

    let captured = posted.borrow().clone();
    Ok(captured)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn args(sentinel: Option<&str>, json: Option<&str>) -> SendArgs {
        SendArgs {
            message_type: "get-config".to_string(),
            sentinel: sentinel.map(str::to_string),
            json: json.map(str::to_string),
        }
    }

    #[test]
    fn host_receives_envelope_object() {
        let posted = capture_send(&args(Some("s-1"), Some(r#"{"scope":"all"}"#)))
            .expect("send should succeed");
        assert_eq!(
            posted,
            vec![json!({"type": "get-config", "sentinel": "s-1", "scope": "all"})]
        );
    }

    #[test]
    fn unset_sentinel_is_omitted() {
        let posted = capture_send(&args(None, None)).expect("send should succeed");
        assert_eq!(posted, vec![json!({"type": "get-config"})]);
    }

    #[test]
    fn payload_overrides_type() {
        let posted = capture_send(&args(Some("s"), Some(r#"{"type":"other"}"#)))
            .expect("send should succeed");
        assert_eq!(posted[0]["type"], json!("other"));
    }
}
