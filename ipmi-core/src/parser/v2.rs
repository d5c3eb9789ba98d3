//! Extended SDR listing (`sdr elist`).
//!
//! ```text
//! SEL              | 72h | ns  |  7.1 | No Reading
//! Intrusion        | 73h | ok  |  7.1 |
//! Power Supply 1   | 03h | ok  | 10.1 | 110 Watts, Presence detected
//! ```

use super::normalize::{normalize_status_word, snake_case, Reading};
use crate::observability::metrics::record_lines_skipped;
use crate::types::{MetricVersion, SensorRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// `<label> | <code>h | <status> | <entity> | <reading>`
static V2_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<name>[^|]+)\|\s*[0-9A-Fa-f]+h\s*\|(?P<status>[^|]*)\|(?P<entity>[^|]*)\|(?P<reading>[^|]*)$",
    )
    .expect("Invalid v2 line regex")
});

/// Parse a V2 report. Lines missing any of the pipe-delimited fields are
/// skipped.
pub fn parse_v2(output: &[u8], server: Option<&str>) -> Vec<SensorRecord> {
    let text = String::from_utf8_lossy(output);
    let mut records = Vec::new();
    let mut skipped = 0u64;

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        match parse_line(line, server) {
            Some(record) => records.push(record),
            None => {
                debug!(line = %line, "Skipping unparseable v2 line");
                skipped += 1;
            }
        }
    }

    record_lines_skipped(MetricVersion::V2, skipped);
    records
}

fn parse_line(line: &str, server: Option<&str>) -> Option<SensorRecord> {
    let caps = V2_LINE.captures(line)?;

    let name = snake_case(&caps["name"]);
    if name.is_empty() {
        return None;
    }

    let status_code = Some(caps["status"].trim().to_lowercase()).filter(|s| !s.is_empty());
    let entity_id = Some(caps["entity"].trim().to_string()).filter(|s| !s.is_empty());

    let mut record = match Reading::classify(&caps["reading"]) {
        Reading::Analog { value, unit, detail } => {
            let mut record = SensorRecord::new(name, value);
            record.unit = unit;
            record.status_desc = detail;
            record
        }
        Reading::Hex(value) => SensorRecord::new(name, value),
        Reading::Discrete(word) => {
            let mut record = SensorRecord::new(name, 0.0);
            record.status_desc = Some(normalize_status_word(&word)).filter(|d| !d.is_empty());
            record
        }
        // No extended description: reuse the status code.
        Reading::Empty => {
            let mut record = SensorRecord::new(name, 0.0);
            record.status_desc =
                status_code.as_deref().map(normalize_status_word).filter(|d| !d.is_empty());
            record
        }
    };

    record.status_code = status_code;
    record.entity_id = entity_id;
    Some(record.with_server(server))
}
