//! Parsed sensor readings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tag key carrying the BMC host a record came from.
pub const SERVER_TAG: &str = "server";

/// Sensor status as reported by the SDR listing.
///
/// The legacy listing only maps `ok` to a number; every other status word is
/// surfaced as text rather than guessed into a numeric code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Status {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One normalized reading extracted from a report line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    /// Lower-case, underscore-separated sensor label.
    pub name: String,
    /// Numeric reading. Discrete sensors read 0.
    pub value: f64,
    /// Normalized unit (e.g. `watts`, `degrees_c`).
    pub unit: Option<String>,
    /// Status field (legacy listing only).
    pub status: Option<Status>,
    /// Raw status code, lower-cased (`ok`, `ns`, `cr`...).
    pub status_code: Option<String>,
    /// Normalized status description (`presence_detected`, `no_reading`...).
    pub status_desc: Option<String>,
    /// Dotted entity id (e.g. `10.1`).
    pub entity_id: Option<String>,
    /// Extra tags; `server` is set when the reading came from a remote BMC.
    pub tags: BTreeMap<String, String>,
}

impl SensorRecord {
    /// Create a record with only a name and value.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            unit: None,
            status: None,
            status_code: None,
            status_desc: None,
            entity_id: None,
            tags: BTreeMap::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach the `server` tag when a host is known; `None` leaves it off.
    pub fn with_server(mut self, server: Option<&str>) -> Self {
        if let Some(host) = server.filter(|h| !h.is_empty()) {
            self.tags.insert(SERVER_TAG.to_string(), host.to_string());
        }
        self
    }

    /// The `server` tag, if present.
    pub fn server(&self) -> Option<&str> {
        self.tags.get(SERVER_TAG).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_tag_only_with_host() {
        let record = SensorRecord::new("fan1", 5040.0).with_server(Some("10.0.0.1"));
        assert_eq!(record.server(), Some("10.0.0.1"));

        let record = SensorRecord::new("fan1", 5040.0).with_server(None);
        assert!(record.server().is_none());

        let record = SensorRecord::new("fan1", 5040.0).with_server(Some(""));
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Numeric(1).to_string(), "1");
        assert_eq!(Status::Text("ns".into()).to_string(), "ns");
    }
}
