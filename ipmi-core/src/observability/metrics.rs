//! Collector metrics definitions.
//!
//! All metrics follow Prometheus naming conventions:
//! - `_total` suffix for counters
//! - `_seconds` suffix for histograms measuring duration
//!
//! Without an installed recorder every helper here is a no-op.

use crate::types::{MetricVersion, SensorKind};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Register all collector metrics with descriptions.
pub fn register_collector_metrics() {
    describe_histogram!(
        "ipmi_gather_duration_seconds",
        "Time taken to run and parse one report (by sensor)"
    );
    describe_counter!("ipmi_gather_records_total", "Total number of records emitted (by sensor)");
    describe_counter!(
        "ipmi_gather_failures_total",
        "Total number of failed gathers (by sensor, kind)"
    );
    describe_counter!(
        "ipmi_report_lines_skipped_total",
        "Total SDR report lines that did not parse (by format)"
    );
}

/// Record a completed gather.
pub fn record_gather(sensor: SensorKind, duration: Duration, records: usize) {
    histogram!("ipmi_gather_duration_seconds", "sensor" => sensor.as_str())
        .record(duration.as_secs_f64());
    counter!("ipmi_gather_records_total", "sensor" => sensor.as_str()).increment(records as u64);
}

/// Record a failed gather, labelled with [`crate::IpmiError::kind`].
pub fn record_gather_failure(sensor: SensorKind, kind: &'static str) {
    counter!("ipmi_gather_failures_total", "sensor" => sensor.as_str(), "kind" => kind)
        .increment(1);
}

pub fn record_lines_skipped(version: MetricVersion, count: u64) {
    if count > 0 {
        counter!("ipmi_report_lines_skipped_total", "format" => version.to_string())
            .increment(count);
    }
}
