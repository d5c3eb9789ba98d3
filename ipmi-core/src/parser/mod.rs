//! Report parsers.
//!
//! Every parser takes the raw stdout bytes and the optional `server` tag and
//! returns normalized [`SensorRecord`]s. The SDR listings are lenient: lines
//! that do not fit the format are skipped and counted. The single-purpose
//! reports are strict and fail with [`crate::IpmiError::Format`].

pub mod chassis;
pub mod dcmi;
pub mod normalize;
pub mod v1;
pub mod v2;

pub use chassis::{parse_chassis_power_status, CHASSIS_POWER_STATUS};
pub use dcmi::parse_dcmi_power_reading;
pub use normalize::{normalize_status_word, normalize_unit, snake_case, Reading};
pub use v1::parse_v1;
pub use v2::parse_v2;

use crate::error::Result;
use crate::types::{MetricVersion, SensorKind, SensorRecord};

/// Parse the output of `kind`'s sub-command.
///
/// `version` only affects the SDR listing.
pub fn parse_report(
    kind: SensorKind,
    version: MetricVersion,
    output: &[u8],
    server: Option<&str>,
) -> Result<Vec<SensorRecord>> {
    match kind {
        SensorKind::Sdr => Ok(match version {
            MetricVersion::V1 => parse_v1(output, server),
            MetricVersion::V2 => parse_v2(output, server),
        }),
        SensorKind::ChassisPowerStatus => parse_chassis_power_status(output, server).map(|r| vec![r]),
        SensorKind::DcmiPowerReading => parse_dcmi_power_reading(output, server),
    }
}
