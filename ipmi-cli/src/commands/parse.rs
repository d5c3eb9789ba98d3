//! `ipmi-sensor parse` command

use super::output::print_metrics;
use anyhow::{Context, Result};
use chrono::Utc;
use ipmi_core::{parse_report, Metric, MetricVersion, SensorKind};
use std::path::Path;

/// Parse a saved report and print its readings.
pub fn parse(
    file: &Path,
    kind: SensorKind,
    version: MetricVersion,
    server: Option<&str>,
    json: bool,
) -> Result<()> {
    let output =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let records = parse_report(kind, version, &output, server)?;
    let timestamp = Utc::now();
    let metrics: Vec<Metric> = records.iter().map(|r| Metric::from_record(r, timestamp)).collect();

    print_metrics(&metrics, json)
}
