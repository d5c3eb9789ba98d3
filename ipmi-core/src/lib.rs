//! IPMI Core Library
//!
//! Builds ipmitool invocations from compact connection descriptors, runs them
//! under a time budget and turns the textual reports into normalized sensor
//! records.

pub mod collector;
pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod exec;
pub mod observability;
pub mod parser;
pub mod types;

// Re-export commonly used items
pub use collector::{Accumulator, IpmiCollector, MemoryAccumulator};
pub use command::{sanitize_args, CommandBuilder, CommandSpec, REDACTED};
pub use config::{IpmiConfig, ResolvedConfig};
pub use connection::ConnectionDescriptor;
pub use error::{IpmiError, Result};
pub use exec::{CommandExecutor, TokioExecutor};
pub use observability::init as init_observability;
pub use parser::parse_report;
pub use types::{FieldValue, Metric, MetricVersion, SensorKind, SensorRecord, Status};
