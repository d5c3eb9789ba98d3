//! Metric emissions handed to the agent's accumulator.

use super::record::{SensorRecord, Status};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Measurement name every IPMI metric is emitted under.
pub const MEASUREMENT: &str = "ipmi_sensor";

/// A single metric field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Float(f64),
    Int(i64),
    Text(String),
}

impl From<&Status> for FieldValue {
    fn from(status: &Status) -> Self {
        match status {
            Status::Numeric(n) => Self::Int(*n),
            Status::Text(s) => Self::Text(s.clone()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}i", v),
            Self::Text(v) => write!(f, "{:?}", v),
        }
    }
}

/// `(name, tags, fields, timestamp)` tuple as the agent expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
    pub timestamp: DateTime<Utc>,
}

impl Metric {
    /// Convert a parsed record. Descriptive attributes become tags, the
    /// reading and status become fields.
    pub fn from_record(record: &SensorRecord, timestamp: DateTime<Utc>) -> Self {
        let mut tags = record.tags.clone();
        tags.insert("name".to_string(), record.name.clone());

        let optional_tags = [
            ("unit", &record.unit),
            ("status_code", &record.status_code),
            ("status_desc", &record.status_desc),
            ("entity_id", &record.entity_id),
        ];
        for (key, value) in optional_tags {
            if let Some(value) = value {
                tags.insert(key.to_string(), value.clone());
            }
        }

        let mut fields = BTreeMap::new();
        fields.insert("value".to_string(), FieldValue::Float(record.value));
        if let Some(status) = &record.status {
            fields.insert("status".to_string(), FieldValue::from(status));
        }

        Self { measurement: MEASUREMENT.to_string(), tags, fields, timestamp }
    }

    /// Tag lookup.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Field lookup.
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Render as a single JSON line.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Influx line-protocol style rendering, used for human inspection.
impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.measurement)?;
        for (key, value) in &self.tags {
            write!(f, ",{}={}", key, value.replace(' ', "\\ "))?;
        }
        let fields: Vec<String> =
            self.fields.iter().map(|(key, value)| format!("{}={}", key, value)).collect();
        write!(f, " {}", fields.join(","))?;
        write!(f, " {}", self.timestamp.timestamp_nanos_opt().unwrap_or_default())
    }
}
