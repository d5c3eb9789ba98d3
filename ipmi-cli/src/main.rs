use anyhow::Result;
use clap::{Parser, Subcommand};
use ipmi_core::{MetricVersion, SensorKind};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "ipmi-sensor")]
#[command(about = "Collect IPMI sensor readings through ipmitool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one gather cycle and print the readings
    Gather {
        /// Connection descriptor (user:pass@interface(host)); repeatable
        #[arg(short, long, env = "IPMI_SERVERS", value_delimiter = ',')]
        server: Vec<String>,

        /// Path to ipmitool (default: look it up on PATH)
        #[arg(long)]
        path: Option<String>,

        /// Privilege level (e.g. USER, OPERATOR, ADMINISTRATOR)
        #[arg(short = 'L', long)]
        privilege: Option<String>,

        /// Hex encoded Kg key
        #[arg(long)]
        hex_key: Option<String>,

        /// Per-command timeout in seconds
        #[arg(short, long, default_value = "20")]
        timeout: u64,

        /// SDR report format (1 = sdr, 2 = sdr elist)
        #[arg(short = 'm', long, default_value = "1")]
        metric_version: u8,

        /// Report to collect (sdr, chassis_power_status, dcmi_power_reading); repeatable
        #[arg(long = "sensor", default_value = "sdr")]
        sensors: Vec<String>,

        /// Run ipmitool through sudo
        #[arg(long)]
        use_sudo: bool,

        /// Cache SDR definitions on disk
        #[arg(long)]
        use_cache: bool,

        /// Directory for SDR cache files
        #[arg(long)]
        cache_path: Option<String>,

        /// Print JSON lines instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Parse a saved report
    Parse {
        /// Report file
        file: PathBuf,

        /// Report kind
        #[arg(short, long, default_value = "sdr", value_parser = parse_kind)]
        kind: SensorKind,

        /// SDR report format (1 or 2)
        #[arg(short = 'm', long, default_value = "1", value_parser = parse_version)]
        metric_version: MetricVersion,

        /// Value for the server tag
        #[arg(short, long)]
        server: Option<String>,

        /// Print JSON lines instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn parse_kind(s: &str) -> std::result::Result<SensorKind, String> {
    SensorKind::parse(s).ok_or_else(|| format!("unknown report kind: {}", s))
}

fn parse_version(s: &str) -> std::result::Result<MetricVersion, String> {
    let version: u8 = s.parse().map_err(|_| format!("invalid metric version: {}", s))?;
    MetricVersion::try_from(version).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = ipmi_core::init_observability() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match cli.command {
        Commands::Gather {
            server,
            path,
            privilege,
            hex_key,
            timeout,
            metric_version,
            sensors,
            use_sudo,
            use_cache,
            cache_path,
            json,
        } => {
            let mut config = ipmi_core::IpmiConfig {
                servers: server,
                privilege,
                hex_key,
                timeout,
                metric_version,
                sensors,
                use_sudo,
                use_cache,
                ..Default::default()
            };
            if let Some(path) = path {
                config.path = path;
            }
            if let Some(cache_path) = cache_path {
                config.cache_path = cache_path;
            }

            let failed = commands::gather(&config, json).await?;
            if failed {
                std::process::exit(1);
            }
        }

        Commands::Parse { file, kind, metric_version, server, json } => {
            commands::parse(&file, kind, metric_version, server.as_deref(), json)?;
        }
    }

    Ok(())
}
