use serde_json::Value;

use crate::envelope::{json_kind, Envelope};
use crate::error::{FrameError, Result};

/// Literal prefix marking an inbound frame.
pub const FRAME_PREFIX: &str = "amp-";

/// Encode an envelope into the inbound wire form.
///
/// Wire format:
/// ```text
/// amp-{"type":"...","sentinel":"...",...}
/// └──┘└──────────── JSON object ─────────┘
/// prefix
/// ```
pub fn encode_frame(envelope: &Envelope, prefix: &str) -> Result<String> {
    let body = serde_json::to_string(envelope)?;
    let mut frame = String::with_capacity(prefix.len() + body.len());
    frame.push_str(prefix);
    frame.push_str(&body);
    Ok(frame)
}

/// Text of posted event data, if it could carry a frame at all.
///
/// Only non-empty strings qualify. Arrays, objects and numbers are never
/// frames, even when their string form would start with the prefix.
pub fn frame_text(data: &Value) -> Option<&str> {
    match data {
        Value::String(text) if !text.is_empty() => Some(text),
        _ => None,
    }
}

/// Decode a frame string into an envelope.
///
/// The text must start with `prefix` and the rest must be a JSON object.
pub fn decode_frame(text: &str, prefix: &str) -> Result<Envelope> {
    let body = text
        .strip_prefix(prefix)
        .ok_or_else(|| FrameError::MissingPrefix {
            prefix: prefix.to_string(),
        })?;

    match serde_json::from_str::<Value>(body)? {
        Value::Object(fields) => Ok(Envelope::from(fields)),
        other => Err(FrameError::NotAnObject {
            found: json_kind(&other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::sentinel::Sentinel;

    #[test]
    fn encode_prepends_prefix() {
        let envelope = Envelope::outbound("amp-ping", Some(&Sentinel::from("s1")));
        let frame = encode_frame(&envelope, FRAME_PREFIX).expect("encode should succeed");
        assert!(frame.starts_with("amp-{"));

        let decoded = decode_frame(&frame, FRAME_PREFIX).expect("decode should succeed");
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn decode_keeps_extra_fields() {
        let decoded = decode_frame(
            r#"amp-{"type":"embed-size","sentinel":"s","height":10,"nested":{"a":[1]}}"#,
            FRAME_PREFIX,
        )
        .expect("decode should succeed");
        assert_eq!(decoded.message_type(), Some("embed-size"));
        assert_eq!(decoded.get("nested"), Some(&json!({"a": [1]})));
    }

    #[test]
    fn decode_requires_prefix() {
        let err = decode_frame(r#"{"type":"x"}"#, FRAME_PREFIX).expect_err("no prefix");
        assert!(matches!(err, FrameError::MissingPrefix { .. }));

        let err = decode_frame(r#"AMP-{"type":"x"}"#, FRAME_PREFIX)
            .expect_err("prefix is case sensitive");
        assert!(matches!(err, FrameError::MissingPrefix { .. }));
    }

    #[test]
    fn decode_rejects_malformed_json() {
        let err = decode_frame("amp-{not json", FRAME_PREFIX).expect_err("bad json");
        assert!(matches!(err, FrameError::Json(_)));

        let err = decode_frame("amp-", FRAME_PREFIX).expect_err("empty body");
        assert!(matches!(err, FrameError::Json(_)));
    }

    #[test]
    fn decode_rejects_non_objects() {
        for (frame, kind) in [("amp-5", "number"), ("amp-null", "null"), ("amp-[1]", "array")] {
            let err = decode_frame(frame, FRAME_PREFIX).expect_err("non-object body");
            assert!(matches!(err, FrameError::NotAnObject { found } if found == kind));
        }
    }

    #[test]
    fn frame_text_accepts_only_non_empty_strings() {
        assert_eq!(frame_text(&json!("amp-{}")), Some("amp-{}"));
        assert_eq!(frame_text(&json!("hello")), Some("hello"));
        assert_eq!(frame_text(&json!(["amp-{}"])), None);
        assert_eq!(frame_text(&json!({"type": "x"})), None);
        assert_eq!(frame_text(&json!(12)), None);
        assert_eq!(frame_text(&json!(true)), None);
        assert_eq!(frame_text(&json!("")), None);
        assert_eq!(frame_text(&json!(null)), None);
    }
}
