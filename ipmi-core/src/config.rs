//! Collector configuration.

use crate::error::{IpmiError, Result};
use crate::types::{MetricVersion, SensorKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Binary looked up on `PATH` when no explicit path is configured.
pub const DEFAULT_TOOL: &str = "ipmitool";

/// Default per-command time budget, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Collector configuration as supplied by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpmiConfig {
    /// Path to ipmitool. Empty means look it up on `PATH`.
    pub path: String,
    /// Privilege level (`-L`), e.g. `USER` or `ADMINISTRATOR`.
    pub privilege: Option<String>,
    /// Hex encoded Kg key (`-y`).
    pub hex_key: Option<String>,
    /// Connection descriptors (`user:pass@intf(host)`). Empty queries the
    /// local BMC.
    pub servers: Vec<String>,
    /// Per-command timeout in seconds.
    pub timeout: u64,
    /// SDR report format: `1` (`sdr`) or `2` (`sdr elist`).
    pub metric_version: u8,
    /// Reports to collect.
    pub sensors: Vec<String>,
    pub use_sudo: bool,
    /// Cache SDR definitions on disk and pass them back with `-S`.
    pub use_cache: bool,
    /// Directory for SDR cache files.
    pub cache_path: String,
}

impl Default for IpmiConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            privilege: None,
            hex_key: None,
            servers: Vec::new(),
            timeout: DEFAULT_TIMEOUT_SECS,
            metric_version: 1,
            sensors: vec![SensorKind::Sdr.as_str().to_string()],
            use_sudo: false,
            use_cache: false,
            cache_path: std::env::temp_dir().to_string_lossy().to_string(),
        }
    }
}

/// Validated configuration the collector runs from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub tool: PathBuf,
    pub privilege: Option<String>,
    pub hex_key: Option<String>,
    /// Raw descriptors. Each is parsed by its own gather so that a malformed
    /// one only fails its own target.
    pub servers: Vec<String>,
    pub timeout: Duration,
    pub metric_version: MetricVersion,
    pub sensors: Vec<SensorKind>,
    pub use_sudo: bool,
    pub use_cache: bool,
    pub cache_path: PathBuf,
}

impl IpmiConfig {
    /// Check every field without touching the file system.
    pub fn validate(&self) -> Result<()> {
        self.version()?;
        self.sensor_kinds()?;

        if self.timeout == 0 {
            return Err(IpmiError::config("timeout must be greater than zero"));
        }

        if let Some(key) = self.hex_key.as_deref().filter(|k| !k.is_empty()) {
            let digits = key.strip_prefix("0x").or_else(|| key.strip_prefix("0X")).unwrap_or(key);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(IpmiError::config("hex_key must be a hexadecimal string"));
            }
        }

        if self.use_cache && self.cache_path.trim().is_empty() {
            return Err(IpmiError::config("cache_path must be set when use_cache is enabled"));
        }

        Ok(())
    }

    /// Validate and locate the tool binary.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let tool = if self.path.trim().is_empty() {
            which::which(DEFAULT_TOOL).map_err(|e| {
                IpmiError::config(format!("{} not found on PATH: {}", DEFAULT_TOOL, e))
            })?
        } else {
            PathBuf::from(self.path.trim())
        };

        Ok(ResolvedConfig {
            tool,
            privilege: non_empty(&self.privilege),
            hex_key: non_empty(&self.hex_key),
            servers: self.servers.iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
            timeout: Duration::from_secs(self.timeout),
            metric_version: self.version()?,
            sensors: self.sensor_kinds()?,
            use_sudo: self.use_sudo,
            use_cache: self.use_cache,
            cache_path: PathBuf::from(&self.cache_path),
        })
    }

    fn version(&self) -> Result<MetricVersion> {
        MetricVersion::try_from(self.metric_version)
    }

    fn sensor_kinds(&self) -> Result<Vec<SensorKind>> {
        if self.sensors.is_empty() {
            return Err(IpmiError::config("at least one sensor must be selected"));
        }

        let mut kinds = Vec::with_capacity(self.sensors.len());
        for name in &self.sensors {
            let kind = SensorKind::parse(name).ok_or_else(|| {
                IpmiError::config(format!(
                    "unknown sensor {:?} (expected one of: sdr, chassis_power_status, dcmi_power_reading)",
                    name
                ))
            })?;
            if kinds.contains(&kind) {
                return Err(IpmiError::config(format!("duplicate sensor {:?}", name)));
            }
            kinds.push(kind);
        }
        Ok(kinds)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
