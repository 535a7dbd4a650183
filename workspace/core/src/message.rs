//! Message envelopes built from save requests.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result, SignedRequest, X_MESHBLU_ROUTE};

/// Envelope mapped from a request but not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEnvelope {
    /// Request body.
    pub data: Value,
    /// Decoded route header.
    pub route: Value,
    /// Parsed date header.
    pub date: DateTime<Utc>,
}

/// Validated message handed to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message content.
    pub data: Data,
    /// Routing and time information taken from headers.
    pub metadata: Metadata,
}

/// Content of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data {
    /// Devices the message concerns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<Value>>,
    /// Message topic.
    pub topic: String,
    /// Message payload.
    pub payload: Map<String, Value>,
}

/// Metadata for a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Route the message travelled, the first entry is the sender.
    pub route: Vec<Value>,
    /// Date the message was sent.
    pub date: DateTime<Utc>,
}

impl Envelope {
    /// Identifier of the sending device, the first route entry.
    pub fn sender(&self) -> Option<&str> {
        self.metadata.route.first().and_then(Value::as_str)
    }

    /// Sensor identifier from the payload.
    pub fn sensor_id(&self) -> Option<String> {
        match self.data.payload.get("sensorId")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// Map a request and its decoded body to an envelope.
///
/// The route and date come from headers, never from the body.
pub fn map_request<R: SignedRequest>(
    request: &R,
    body: Value,
) -> Result<RawEnvelope> {
    let route = request
        .header(X_MESHBLU_ROUTE)
        .ok_or_else(|| Error::MalformedRoute("missing header".to_owned()))?;
    let route: Value = serde_json::from_str(&route)
        .map_err(|e| Error::MalformedRoute(e.to_string()))?;

    let date = request
        .header(http::header::DATE.as_str())
        .ok_or_else(|| Error::InvalidDate("missing header".to_owned()))?;
    let date = parse_date(&date)?;

    Ok(RawEnvelope {
        data: body,
        route,
        date,
    })
}

/// Parse a date header value.
///
/// Accepts RFC 2822 dates (which covers the IMF-fixdate form
/// used by HTTP) and RFC 3339 timestamps. The day of the week is
/// not checked against the date.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    let dated = match value.split_once(", ") {
        Some((day, rest))
            if day.len() == 3 && day.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            rest
        }
        _ => value,
    };
    DateTime::parse_from_rfc2822(dated)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| Error::InvalidDate(format!("{}: {}", value, e)))
}
