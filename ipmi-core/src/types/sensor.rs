//! Report selection types.

use crate::error::IpmiError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which ipmitool report to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Sensor data repository listing.
    Sdr,
    /// Chassis power on/off state.
    ChassisPowerStatus,
    /// DCMI power-reading summary block.
    DcmiPowerReading,
}

impl SensorKind {
    /// All supported kinds.
    pub const ALL: [SensorKind; 3] =
        [SensorKind::Sdr, SensorKind::ChassisPowerStatus, SensorKind::DcmiPowerReading];

    /// Parse from the configuration token.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sdr" => Some(Self::Sdr),
            "chassis_power_status" => Some(Self::ChassisPowerStatus),
            "dcmi_power_reading" => Some(Self::DcmiPowerReading),
            _ => None,
        }
    }

    /// Configuration token for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sdr => "sdr",
            Self::ChassisPowerStatus => "chassis_power_status",
            Self::DcmiPowerReading => "dcmi_power_reading",
        }
    }

    /// ipmitool sub-command tokens for this report.
    pub fn subcommand(&self, version: MetricVersion) -> Vec<&'static str> {
        match (self, version) {
            (Self::Sdr, MetricVersion::V1) => vec!["sdr"],
            (Self::Sdr, MetricVersion::V2) => vec!["sdr", "elist"],
            (Self::ChassisPowerStatus, _) => vec!["chassis", "power", "status"],
            (Self::DcmiPowerReading, _) => vec!["dcmi", "power", "reading"],
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SDR report format version.
///
/// `V1` is the legacy three-column `sdr` listing, `V2` the five-column
/// `sdr elist` listing with sensor codes and entity ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MetricVersion {
    #[default]
    V1,
    V2,
}

impl TryFrom<u8> for MetricVersion {
    type Error = IpmiError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(IpmiError::config(format!(
                "unsupported metric_version {} (expected 1 or 2)",
                other
            ))),
        }
    }
}

impl From<MetricVersion> for u8 {
    fn from(version: MetricVersion) -> Self {
        match version {
            MetricVersion::V1 => 1,
            MetricVersion::V2 => 2,
        }
    }
}

impl fmt::Display for MetricVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", u8::from(*self))
    }
}
