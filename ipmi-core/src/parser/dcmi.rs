//! `dcmi power reading` summary block.
//!
//! ```text
//!     Instantaneous power reading:                   167 Watts
//!     Minimum during sampling period:                  6 Watts
//!     Maximum during sampling period:                420 Watts
//!     Average power reading over sample period:      165 Watts
//!     IPMI timestamp:                           Thu Jan  1 00:00:00 1970
//!     Sampling period:                          00000005 Seconds.
//!     Power reading state is:                   activated
//! ```

use super::normalize::snake_case;
use crate::error::{IpmiError, Result};
use crate::types::{SensorKind, SensorRecord};
use once_cell::sync::Lazy;
use regex::Regex;

/// Labels that carry a power figure. Every other line is metadata.
const POWER_LABELS: [&str; 4] = [
    "Instantaneous power reading",
    "Minimum during sampling period",
    "Maximum during sampling period",
    "Average power reading over sample period",
];

const POWER_UNIT: &str = "watts";

static LABELED_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<label>[^:]+):\s*(?P<value>[-+]?\d+(?:\.\d+)?)\s*(?i:watts)?\s*$")
        .expect("Invalid dcmi line regex")
});

/// Parse the four power lines into `watts` records named after their labels.
///
/// Fails with [`IpmiError::Format`] when none of them is present, which is
/// what a BMC without DCMI support prints.
pub fn parse_dcmi_power_reading(output: &[u8], server: Option<&str>) -> Result<Vec<SensorRecord>> {
    let text = String::from_utf8_lossy(output);

    let records: Vec<SensorRecord> = text
        .lines()
        .filter_map(|line| LABELED_VALUE.captures(line.trim()))
        .filter(|caps| POWER_LABELS.iter().any(|label| caps["label"].trim().eq_ignore_ascii_case(label)))
        .filter_map(|caps| {
            let value = caps["value"].parse::<f64>().ok()?;
            Some(
                SensorRecord::new(snake_case(&caps["label"]), value)
                    .with_unit(POWER_UNIT)
                    .with_server(server),
            )
        })
        .collect();

    if records.is_empty() {
        return Err(IpmiError::format(
            SensorKind::DcmiPowerReading.as_str(),
            "no power reading lines found",
        ));
    }

    Ok(records)
}
