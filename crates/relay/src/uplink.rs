use std::fmt;

use serde_json::{Map, Value};

use crate::error::{RelayError, Result};

const DEVICE_ID_POINTER: &str = "/end_device_ids/device_id";
const DECODED_PAYLOAD_POINTER: &str = "/uplink_message/decoded_payload";

/// A TTN uplink webhook body.
///
/// The body is kept as an untyped JSON tree: only the device id and the
/// decoded payload are read, and any level of either path may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Uplink(Value);

impl Uplink {
    /// Parse a webhook body. The top-level value must be a JSON object.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(RelayError::NotAnObject);
        }
        Ok(Self(value))
    }

    /// `end_device_ids.device_id`, if present and truthy.
    ///
    /// Strings are used verbatim, other scalars are rendered as JSON text.
    pub fn device_id(&self) -> Option<String> {
        match self.0.pointer(DEVICE_ID_POINTER)? {
            value if !is_truthy(value) => None,
            Value::String(id) => Some(id.clone()),
            value => Some(value.to_string()),
        }
    }

    /// `uplink_message.decoded_payload`, or `None` when any level is missing
    /// or the value is not an object.
    pub fn decoded_payload(&self) -> Option<&Map<String, Value>> {
        self.0.pointer(DECODED_PAYLOAD_POINTER)?.as_object()
    }
}

impl fmt::Display for Uplink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
