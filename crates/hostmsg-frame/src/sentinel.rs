use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::coerce::{string_to_number, to_js_number, to_js_string};

/// Correlation token carried in every frame of a session.
///
/// Not a secret: it only separates this client's traffic from unrelated
/// messages sharing the channel. Hosts may hand it out as a string or a
/// number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sentinel {
    Text(String),
    Number(Number),
}

/// How a decoded `sentinel` field is compared with the configured one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentinelMatch {
    /// Abstract (coercing) equality: `"42"` matches `42`.
    #[default]
    Loose,
    /// Same JSON type and value.
    Strict,
}

impl Sentinel {
    /// The sentinel as it appears in an envelope.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Number(n) => Value::Number(n.clone()),
        }
    }

    /// Compare a decoded frame field with this sentinel.
    pub fn matches(&self, candidate: &Value, mode: SentinelMatch) -> bool {
        match mode {
            SentinelMatch::Loose => self.loose_eq(candidate),
            SentinelMatch::Strict => self.strict_eq(candidate),
        }
    }

    fn strict_eq(&self, candidate: &Value) -> bool {
        match (self, candidate) {
            (Self::Text(expected), Value::String(actual)) => expected == actual,
            (Self::Number(expected), Value::Number(actual)) => num_eq(expected, actual),
            _ => false,
        }
    }

    fn loose_eq(&self, candidate: &Value) -> bool {
        match (self, candidate) {
            (_, Value::Null) => false,
            (Self::Text(expected), Value::String(actual)) => expected == actual,
            (Self::Text(expected), Value::Number(actual)) => {
                as_f64(actual) == string_to_number(expected)
            }
            (Self::Number(expected), Value::String(actual)) => {
                as_f64(expected) == string_to_number(actual)
            }
            (Self::Number(expected), Value::Number(actual)) => {
                as_f64(expected) == as_f64(actual)
            }
            (Self::Text(expected), Value::Bool(_)) => {
                to_js_number(candidate) == string_to_number(expected)
            }
            (Self::Number(expected), Value::Bool(_)) => as_f64(expected) == to_js_number(candidate),
            // Objects and arrays collapse to their string form first.
            (_, Value::Array(_) | Value::Object(_)) => {
                self.loose_eq(&Value::String(to_js_string(candidate)))
            }
        }
    }
}

fn as_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

fn num_eq(a: &Number, b: &Number) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(a), Some(b)) => a == b,
        _ => as_f64(a) == as_f64(b),
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Sentinel {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Sentinel {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Sentinel {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Sentinel {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for Sentinel {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for Sentinel {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}
