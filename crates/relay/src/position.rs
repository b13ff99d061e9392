use std::fmt;

use serde_json::{Map, Value};

use crate::config::PayloadKeys;

pub const PARAM_ID: &str = "id";
pub const PARAM_LAT: &str = "lat";
pub const PARAM_LON: &str = "lon";
pub const PARAM_BATT: &str = "batt";

/// Query parameters of an OsmAnd position report, in send order.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionParams {
    params: Vec<(&'static str, Value)>,
}

/// Result of mapping a decoded payload onto OsmAnd parameters
#[derive(Debug, Clone, PartialEq)]
pub struct MappedPosition {
    pub params: PositionParams,
    /// Configured payload keys that were absent or null
    pub missing: Vec<String>,
}

impl PositionParams {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self { params: vec![(PARAM_ID, Value::String(device_id.into()))] }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.iter().find(|(key, _)| *key == name).map(|(_, value)| value)
    }

    /// Render the parameters as query pairs.
    ///
    /// Strings are sent verbatim, booleans as `true`/`false` and everything
    /// else as compact JSON text.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        self.params.iter().map(|(key, value)| (*key, render_value(value))).collect()
    }

    fn push(&mut self, name: &'static str, value: Value) {
        self.params.push((name, value));
    }
}

impl fmt::Display for PositionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}

/// Map the decoded payload of an uplink onto OsmAnd parameters.
///
/// `id` is always set. `lat`, `lon` and `batt` are copied unchanged from the
/// configured payload keys when present and not null.
pub fn map_position(
    device_id: impl Into<String>,
    payload: Option<&Map<String, Value>>,
    keys: &PayloadKeys,
) -> MappedPosition {
    let mut params = PositionParams::new(device_id);
    let mut missing = Vec::new();

    let fields = [
        (PARAM_LAT, &keys.latitude),
        (PARAM_LON, &keys.longitude),
        (PARAM_BATT, &keys.battery),
    ];

    for (param, payload_key) in fields {
        match payload.and_then(|p| p.get(payload_key.as_str())) {
            Some(value) if !value.is_null() => params.push(param, value.clone()),
            _ => missing.push(payload_key.clone()),
        }
    }

    MappedPosition { params, missing }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
