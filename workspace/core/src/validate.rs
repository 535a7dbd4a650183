//! Schema validation for message envelopes.
//!
//! The accepted shape is:
//!
//! ```text
//! data:
//!   devices: array (optional)
//!   topic: non-empty string
//!   payload: object
//! metadata:
//!   route: array
//!   date: timestamp
//! ```
//!
//! Fields that are not part of the shape are rejected.
use serde_json::{Map, Value};

use crate::{
    message::{Data, Envelope, Metadata, RawEnvelope},
    Error, Result,
};

const DATA_FIELDS: &[&str] = &["devices", "topic", "payload"];

/// Validate a mapped envelope.
///
/// The first violation found is reported with the dotted path
/// of the field and a description of the expected type.
pub fn validate(raw: RawEnvelope) -> Result<Envelope> {
    let RawEnvelope { data, route, date } = raw;

    let mut data = match data {
        Value::Object(map) => map,
        _ => return Err(Error::schema("data", "an object")),
    };

    if let Some(unknown) = data.keys().find(|k| !DATA_FIELDS.contains(&k.as_str())) {
        return Err(Error::schema(
            format!("data.{}", unknown),
            "absent (unknown field)",
        ));
    }

    let devices = match data.remove("devices") {
        None => None,
        Some(Value::Array(devices)) => Some(devices),
        Some(_) => return Err(Error::schema("data.devices", "an array")),
    };

    let topic = match data.remove("topic") {
        Some(Value::String(topic)) if !topic.is_empty() => topic,
        _ => return Err(Error::schema("data.topic", "a non-empty string")),
    };

    let payload = object(data.remove("payload"), "data.payload")?;

    let route = match route {
        Value::Array(route) => route,
        _ => return Err(Error::schema("metadata.route", "an array")),
    };

    Ok(Envelope {
        data: Data {
            devices,
            topic,
            payload,
        },
        metadata: Metadata { route, date },
    })
}

fn object(value: Option<Value>, path: &str) -> Result<Map<String, Value>> {
    match value {
        Some(Value::Object(map)) => Ok(map),
        _ => Err(Error::schema(path, "an object")),
    }
}
