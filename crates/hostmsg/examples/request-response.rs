//! Embedded client asks its host for configuration and waits for the reply.
//!
//! Run with:
//!   cargo run --example request-response
//!
//! The host answers `get-config` requests with an `amp-` frame that echoes
//! the request's sentinel, so the client's handler fires exactly once.

use hostmsg::client::MessagingClient;
use hostmsg::frame::{encode_frame, Envelope, FRAME_PREFIX};
use hostmsg::transport::{MessageBus, MessageEvent, TargetOrigin, Window};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct EmbedConfig {
    theme: String,
    locale: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bus = MessageBus::new();
    let host = bus.open_top("https://host.example");
    let frame = bus.open_child(host.id(), "https://embed.example");

    let responder = host.clone();
    host.listen(Box::new(move |event: &MessageEvent| {
        eprintln!("host received {}", event.data);
        if event.data["type"] != "get-config" {
            return;
        }
        let reply = Envelope::from(
            json!({
                "type": "config",
                "sentinel": event.data["sentinel"],
                "theme": "dark",
                "locale": "en-GB",
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        );
        match encode_frame(&reply, FRAME_PREFIX) {
            Ok(text) => {
                let _ = responder.post_message(event.source, text.into(), &TargetOrigin::Any);
            }
            Err(e) => eprintln!("encode failed: {e}"),
        }
    }));

    let client = MessagingClient::new(frame);
    client.set_sentinel("session-7f3a");
    client.make_request("get-config", "config", |envelope: &Envelope| {
        let config: EmbedConfig = envelope.deserialize()?;
        println!("theme={} locale={}", config.theme, config.locale);
        Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
    });

    let delivered = bus.pump();
    eprintln!("delivered {delivered} events; stats {:?}", client.stats());
    Ok(())
}
