//! `ipmi-sensor gather` command

use super::output::print_metrics;
use anyhow::Result;
use colored::Colorize;
use ipmi_core::{IpmiCollector, IpmiConfig, MemoryAccumulator};

/// Run one gather cycle. Returns true when any target failed.
pub async fn gather(config: &IpmiConfig, json: bool) -> Result<bool> {
    let collector = IpmiCollector::from_config(config)?;

    let mut acc = MemoryAccumulator::new();
    collector.gather(&mut acc).await;
    let (metrics, errors) = acc.into_parts();
    tracing::debug!(metrics = metrics.len(), errors = errors.len(), "Gather finished");

    print_metrics(&metrics, json)?;

    // Errors are already sanitized.
    for error in &errors {
        eprintln!("{} [{}] {}", "✗".red().bold(), error.kind(), error);
    }

    Ok(!errors.is_empty())
}
