//! Queries for listing stored envelopes.
use serde::Serialize;
use std::collections::BTreeMap;

use meshblu_data_core::Envelope;

const FROM: &str = "from";
const SENSOR_ID: &str = "sensorId";
const TOPIC: &str = "topic";
const SKIP: &str = "skip";
const TAKE: &str = "take";

/// Default number of envelopes in a listing.
pub const DEFAULT_TAKE: usize = 10;

/// Query parameters for a listing request.
///
/// Parameters are kept verbatim so they can be forwarded to
/// collaborators; the accessors interpret the ones understood
/// by the built in storage layers.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct DataQuery {
    params: BTreeMap<String, String>,
}

impl DataQuery {
    /// Create a query from request parameters.
    pub fn new(params: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            params: params.into_iter().collect(),
        }
    }

    /// Restrict the query to a device, replacing any `from` parameter.
    pub fn from_device(mut self, device: impl Into<String>) -> Self {
        self.params.insert(FROM.to_owned(), device.into());
        self
    }

    /// Restrict the query to a sensor, replacing any `sensorId` parameter.
    pub fn from_sensor(mut self, sensor: impl Into<String>) -> Self {
        self.params.insert(SENSOR_ID.to_owned(), sensor.into());
        self
    }

    /// Get a raw parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }

    /// Device the query is scoped to.
    pub fn device(&self) -> Option<&str> {
        self.get(FROM)
    }

    /// Sensor the query is scoped to.
    pub fn sensor(&self) -> Option<&str> {
        self.get(SENSOR_ID)
    }

    /// Number of matching envelopes to skip, invalid values are ignored.
    pub fn skip(&self) -> usize {
        self.get(SKIP).and_then(|s| s.parse().ok()).unwrap_or(0)
    }

    /// Maximum number of envelopes, invalid values are ignored.
    pub fn take(&self) -> usize {
        self.get(TAKE)
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TAKE)
    }

    /// Determine if an envelope matches the filters of this query.
    pub fn matches(&self, envelope: &Envelope) -> bool {
        if let Some(device) = self.device() {
            if envelope.sender() != Some(device) {
                return false;
            }
        }
        if let Some(sensor) = self.sensor() {
            if envelope.sensor_id().as_deref() != Some(sensor) {
                return false;
            }
        }
        if let Some(topic) = self.get(TOPIC) {
            if envelope.data.topic != topic {
                return false;
            }
        }
        true
    }

    /// Filter, order newest first and page a collection of envelopes.
    pub fn apply<'a>(
        &self,
        envelopes: impl IntoIterator<Item = &'a Envelope>,
    ) -> Vec<Envelope> {
        let mut matched: Vec<&Envelope> =
            envelopes.into_iter().filter(|e| self.matches(e)).collect();
        matched.sort_by(|a, b| b.metadata.date.cmp(&a.metadata.date));
        matched
            .into_iter()
            .skip(self.skip())
            .take(self.take())
            .cloned()
            .collect()
    }
}
