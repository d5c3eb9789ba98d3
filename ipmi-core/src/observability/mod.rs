//! Observability infrastructure: tracing and collector self-metrics.
//!
//! The library itself only emits `tracing` events and `metrics` samples.
//! Installing a subscriber (and any recorder) is left to the binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod metrics;

/// Initialize logging to stderr.
///
/// The filter defaults to `info` and can be overridden with `RUST_LOG`.
/// Stdout is left free for collected records.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .try_init()?;

    metrics::register_collector_metrics();

    tracing::debug!("Observability initialized");
    Ok(())
}
