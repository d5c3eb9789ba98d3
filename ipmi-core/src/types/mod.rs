//! Core domain types for IPMI collection.

pub mod metric;
pub mod record;
pub mod sensor;

// Re-exports
pub use metric::{FieldValue, Metric, MEASUREMENT};
pub use record::{SensorRecord, Status, SERVER_TAG};
pub use sensor::{MetricVersion, SensorKind};
