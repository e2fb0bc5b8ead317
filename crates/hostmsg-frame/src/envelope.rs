use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FrameError, Result};
use crate::sentinel::Sentinel;

/// Envelope field carrying the message-type key.
pub const TYPE_FIELD: &str = "type";
/// Envelope field carrying the session sentinel.
pub const SENTINEL_FIELD: &str = "sentinel";

/// A message object: `{type, sentinel, ...payload}`.
///
/// Outbound envelopes are built with [`Envelope::outbound`] and
/// [`Envelope::merge`]. Inbound envelopes come out of
/// [`decode_frame`](crate::decode_frame) and carry every decoded field verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope {
    fields: Map<String, Value>,
}

impl Envelope {
    /// Start an outbound envelope. The sentinel field is omitted when unset.
    pub fn outbound(message_type: &str, sentinel: Option<&Sentinel>) -> Self {
        let mut fields = Map::new();
        fields.insert(TYPE_FIELD.to_string(), Value::String(message_type.to_string()));
        if let Some(sentinel) = sentinel {
            fields.insert(SENTINEL_FIELD.to_string(), sentinel.to_value());
        }
        Self { fields }
    }

    /// Shallow-merge `payload` over the envelope.
    ///
    /// Payload fields win, including `type` and `sentinel`.
    pub fn merge(mut self, payload: Map<String, Value>) -> Self {
        for (key, value) in payload {
            self.fields.insert(key, value);
        }
        self
    }

    /// Serialize `payload` and merge its fields. Non-object payloads are rejected.
    pub fn merge_typed<T: Serialize>(self, payload: &T) -> Result<Self> {
        match serde_json::to_value(payload)? {
            Value::Object(map) => Ok(self.merge(map)),
            other => Err(FrameError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    /// The `type` field, when it is a string.
    pub fn message_type(&self) -> Option<&str> {
        self.fields.get(TYPE_FIELD).and_then(Value::as_str)
    }

    /// The raw `sentinel` field.
    pub fn sentinel(&self) -> Option<&Value> {
        self.fields.get(SENTINEL_FIELD)
    }

    /// Look up any field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// All fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Deserialize the whole envelope into a typed message.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }
}

impl From<Map<String, Value>> for Envelope {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn outbound_without_sentinel_omits_field() {
        let envelope = Envelope::outbound("send-embed-state", None);
        assert_eq!(envelope.into_value(), json!({"type": "send-embed-state"}));
    }

    #[test]
    fn merge_adds_payload_fields() {
        let envelope = Envelope::outbound("amp-ping", Some(&Sentinel::from("s1")))
            .merge(object(json!({"foo": 1})));
        assert_eq!(
            envelope.into_value(),
            json!({"type": "amp-ping", "sentinel": "s1", "foo": 1})
        );
    }

    #[test]
    fn payload_fields_shadow_protocol_fields() {
        let envelope = Envelope::outbound("a", Some(&Sentinel::from("s1")))
            .merge(object(json!({"type": "b", "sentinel": 9})));
        assert_eq!(envelope.message_type(), Some("b"));
        assert_eq!(envelope.sentinel(), Some(&json!(9)));
    }

    #[test]
    fn merge_typed_rejects_non_objects() {
        let err = Envelope::outbound("a", None)
            .merge_typed(&vec![1, 2])
            .expect_err("arrays cannot be merged");
        assert!(matches!(err, FrameError::NotAnObject { found: "array" }));
    }

    #[test]
    fn deserialize_into_typed_message() {
        #[derive(Deserialize)]
        struct Resize {
            #[serde(rename = "type")]
            kind: String,
            height: u32,
        }

        let envelope = Envelope::from(object(json!({"type": "embed-size", "height": 300})));
        let resize: Resize = envelope.deserialize().expect("envelope should deserialize");
        assert_eq!(resize.kind, "embed-size");
        assert_eq!(resize.height, 300);
    }

    #[test]
    fn non_string_type_is_not_a_message_type() {
        let envelope = Envelope::from(object(json!({"type": 5})));
        assert_eq!(envelope.message_type(), None);
        assert_eq!(envelope.get("type"), Some(&json!(5)));
    }
}
