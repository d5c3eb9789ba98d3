//! `chassis power status` report.

use crate::error::{IpmiError, Result};
use crate::types::{SensorKind, SensorRecord};
use once_cell::sync::Lazy;
use regex::Regex;

/// Record name emitted for the power state.
pub const CHASSIS_POWER_STATUS: &str = "chassis_power_status";

static POWER_STATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Chassis Power is (?P<state>on|off)$").expect("Invalid chassis power regex")
});

/// Parse the power state into a single record: 1 for on, 0 for off.
///
/// The output space of this command is tiny, so anything other than exactly
/// one recognised line is a [`IpmiError::Format`].
pub fn parse_chassis_power_status(output: &[u8], server: Option<&str>) -> Result<SensorRecord> {
    let text = String::from_utf8_lossy(output);
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let line = lines.next().ok_or_else(|| report_error("empty output"))?;
    if lines.next().is_some() {
        return Err(report_error("expected a single line"));
    }

    let caps = POWER_STATE
        .captures(line)
        .ok_or_else(|| report_error(format!("unrecognised power state {:?}", line)))?;
    let value = if &caps["state"] == "on" { 1.0 } else { 0.0 };

    Ok(SensorRecord::new(CHASSIS_POWER_STATUS, value).with_server(server))
}

fn report_error(reason: impl Into<String>) -> IpmiError {
    IpmiError::format(SensorKind::ChassisPowerStatus.as_str(), reason)
}
