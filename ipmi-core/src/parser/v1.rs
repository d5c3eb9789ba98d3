//! Legacy three-column SDR listing.
//!
//! ```text
//! Ambient Temp     | 20 degrees C      | ok
//! PS1 Status       | 0x02              | ok
//! DASD Backplane 3 | Not Readable      | ns
//! ```

use super::normalize::{snake_case, Reading};
use crate::observability::metrics::record_lines_skipped;
use crate::types::{MetricVersion, SensorRecord, Status};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// `<label> | <reading> | <status>`, exactly three fields.
static V1_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>[^|]+)\|(?P<reading>[^|]*)\|(?P<status>[^|]*)$")
        .expect("Invalid v1 line regex")
});

/// Parse a V1 report. Lines that do not match, or whose reading is not
/// numeric, are skipped.
pub fn parse_v1(output: &[u8], server: Option<&str>) -> Vec<SensorRecord> {
    let text = String::from_utf8_lossy(output);
    let mut records = Vec::new();
    let mut skipped = 0u64;

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        match parse_line(line, server) {
            Some(record) => records.push(record),
            None => {
                debug!(line = %line, "Skipping unparseable v1 line");
                skipped += 1;
            }
        }
    }

    record_lines_skipped(MetricVersion::V1, skipped);
    records
}

fn parse_line(line: &str, server: Option<&str>) -> Option<SensorRecord> {
    let caps = V1_LINE.captures(line)?;

    let name = snake_case(&caps["name"]);
    if name.is_empty() {
        return None;
    }

    let record = match Reading::classify(&caps["reading"]) {
        Reading::Hex(value) => SensorRecord::new(name, value),
        Reading::Analog { value, unit, .. } => {
            let record = SensorRecord::new(name, value);
            match unit {
                Some(unit) => record.with_unit(unit),
                None => record,
            }
        }
        Reading::Empty | Reading::Discrete(_) => return None,
    };

    let record = match parse_status(&caps["status"]) {
        Some(status) => record.with_status(status),
        None => record,
    };
    Some(record.with_server(server))
}

/// `ok` is the only word with a numeric mapping; anything else is kept as text.
fn parse_status(raw: &str) -> Option<Status> {
    let word = raw.trim();
    if word.is_empty() {
        None
    } else if word.eq_ignore_ascii_case("ok") {
        Some(Status::Numeric(1))
    } else {
        Some(Status::Text(word.to_string()))
    }
}
