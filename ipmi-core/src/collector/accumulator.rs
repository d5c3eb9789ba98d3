//! Hand-off point between the collector and whatever consumes its output.

use crate::error::IpmiError;
use crate::types::Metric;

/// Receives metrics and per-target errors from a gather cycle.
pub trait Accumulator: Send {
    fn add_metric(&mut self, metric: Metric);

    /// Report a failed gather. The error never carries a raw password.
    fn add_error(&mut self, error: IpmiError);
}

/// Keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryAccumulator {
    metrics: Vec<Metric>,
    errors: Vec<IpmiError>,
}

impl MemoryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn errors(&self) -> &[IpmiError] {
        &self.errors
    }

    /// Metrics whose `name` tag equals `name`.
    pub fn metrics_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Metric> + 'a {
        self.metrics.iter().filter(move |m| m.tag("name") == Some(name))
    }

    pub fn into_parts(self) -> (Vec<Metric>, Vec<IpmiError>) {
        (self.metrics, self.errors)
    }
}

impl Accumulator for MemoryAccumulator {
    fn add_metric(&mut self, metric: Metric) {
        self.metrics.push(metric);
    }

    fn add_error(&mut self, error: IpmiError) {
        self.errors.push(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SensorRecord;
    use chrono::Utc;

    #[test]
    fn test_memory_accumulator() {
        let mut acc = MemoryAccumulator::new();
        acc.add_metric(Metric::from_record(&SensorRecord::new("fan1", 5040.0), Utc::now()));
        acc.add_metric(Metric::from_record(&SensorRecord::new("fan2", 4800.0), Utc::now()));
        acc.add_error(IpmiError::config("bad descriptor"));

        assert_eq!(acc.metrics().len(), 2);
        assert_eq!(acc.metrics_named("fan2").count(), 1);
        assert_eq!(acc.errors().len(), 1);

        let (metrics, errors) = acc.into_parts();
        assert_eq!(metrics.len(), 2);
        assert_eq!(errors[0].kind(), "config");
    }
}
