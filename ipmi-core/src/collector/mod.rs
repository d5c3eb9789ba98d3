//! Gather orchestration.
//!
//! One gather cycle runs every configured (target, sensor) pair as its own
//! tokio task. Pairs share nothing mutable, so a slow or failing BMC only
//! affects its own results.

pub mod accumulator;
pub mod cache;

pub use accumulator::{Accumulator, MemoryAccumulator};

use crate::command::CommandBuilder;
use crate::config::{IpmiConfig, ResolvedConfig};
use crate::connection::ConnectionDescriptor;
use crate::error::{IpmiError, Result};
use crate::exec::{CommandExecutor, TokioExecutor};
use crate::observability::metrics::{record_gather, record_gather_failure};
use crate::parser::parse_report;
use crate::types::{Metric, SensorKind, SensorRecord};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

/// Interface used for remote targets that do not name one.
pub const DEFAULT_INTERFACE: &str = "lan";

/// Collects IPMI readings for every configured target.
#[derive(Clone)]
pub struct IpmiCollector {
    config: Arc<ResolvedConfig>,
    executor: Arc<dyn CommandExecutor>,
}

impl IpmiCollector {
    /// Collector that runs ipmitool through `tokio::process`.
    pub fn new(config: ResolvedConfig) -> Self {
        Self::with_executor(config, Arc::new(TokioExecutor::new()))
    }

    /// Collector with a substitute executor.
    pub fn with_executor(config: ResolvedConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        Self { config: Arc::new(config), executor }
    }

    /// Resolve `config` and build a collector from it.
    pub fn from_config(config: &IpmiConfig) -> Result<Self> {
        Ok(Self::new(config.resolve()?))
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Run one gather cycle.
    ///
    /// With no servers configured the local BMC is queried once per sensor.
    /// Each failure is handed to `acc` and does not stop the other pairs.
    pub async fn gather(&self, acc: &mut dyn Accumulator) {
        let targets: Vec<Option<String>> = if self.config.servers.is_empty() {
            vec![None]
        } else {
            self.config.servers.iter().cloned().map(Some).collect()
        };

        let mut tasks = JoinSet::new();
        for target in targets {
            for &kind in &self.config.sensors {
                let collector = self.clone();
                let target = target.clone();
                tasks.spawn(async move { collector.gather_server(target.as_deref(), kind).await });
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(metrics)) => metrics.into_iter().for_each(|m| acc.add_metric(m)),
                Ok(Err(e)) => acc.add_error(e),
                Err(e) => {
                    warn!(error = %e, "Gather task aborted");
                    acc.add_error(IpmiError::Execution {
                        command: "gather task".to_string(),
                        reason: format!("task aborted: {}", e),
                        stderr: String::new(),
                        stdout: Vec::new(),
                    });
                }
            }
        }
    }

    /// Gather one report from one target.
    ///
    /// `server` is a raw descriptor, or `None` for the local BMC.
    #[instrument(skip(self, server), fields(sensor = %kind, server = tracing::field::Empty))]
    pub async fn gather_server(&self, server: Option<&str>, kind: SensorKind) -> Result<Vec<Metric>> {
        let started = Instant::now();

        let result = self.collect(server, kind).await;
        match &result {
            Ok(metrics) => {
                record_gather(kind, started.elapsed(), metrics.len());
                debug!(records = metrics.len(), "Gather complete");
            }
            Err(e) => {
                record_gather_failure(kind, e.kind());
                warn!(error = %e, "Gather failed");
            }
        }
        result
    }

    async fn collect(&self, server: Option<&str>, kind: SensorKind) -> Result<Vec<Metric>> {
        let conn = match server {
            Some(descriptor) => ConnectionDescriptor::parse(descriptor)?,
            None => ConnectionDescriptor::default(),
        };
        let conn = with_default_interface(conn);
        if let Some(host) = conn.server_tag() {
            tracing::Span::current().record("server", host);
        }

        let config = &self.config;
        let mut builder = CommandBuilder::new(config.tool.to_string_lossy())
            .privilege(config.privilege.as_deref())
            .hex_key(config.hex_key.as_deref())
            .sudo(config.use_sudo);

        if config.use_cache && kind == SensorKind::Sdr {
            let path = cache::cache_file(&config.cache_path, &conn);
            cache::ensure_sdr_cache(self.executor.as_ref(), &builder, &conn, &path, config.timeout)
                .await?;
            builder = builder.sdr_cache(Some(&path));
        }

        let spec = builder.build(&conn, &kind.subcommand(config.metric_version));
        let records = match self.executor.run(&spec, config.timeout).await {
            Ok(output) => parse_report(kind, config.metric_version, &output, conn.server_tag())?,
            Err(err) => self.salvage(kind, conn.server_tag(), err)?,
        };

        let timestamp = Utc::now();
        Ok(records.iter().map(|r| Metric::from_record(r, timestamp)).collect())
    }

    /// Keep whatever an SDR listing printed before the tool failed.
    fn salvage(
        &self,
        kind: SensorKind,
        server: Option<&str>,
        err: IpmiError,
    ) -> Result<Vec<SensorRecord>> {
        let partial = match (kind, err.partial_stdout()) {
            (SensorKind::Sdr, Some(partial)) => partial,
            _ => return Err(err),
        };

        let records = parse_report(kind, self.config.metric_version, partial, server)?;
        if records.is_empty() {
            return Err(err);
        }

        warn!(error = %err, records = records.len(), "Tool failed, keeping partial readings");
        Ok(records)
    }
}

/// Remote targets default to the `lan` interface. Local ones are left as is.
fn with_default_interface(mut conn: ConnectionDescriptor) -> ConnectionDescriptor {
    if conn.is_remote() && conn.interface.is_empty() {
        conn.interface = DEFAULT_INTERFACE.to_string();
    }
    conn
}
