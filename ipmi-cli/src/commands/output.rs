//! Metric rendering shared by every command.

use anyhow::Result;
use colored::Colorize;
use ipmi_core::{FieldValue, Metric};
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "SERVER")]
    server: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "VALUE")]
    value: String,
    #[tabled(rename = "UNIT")]
    unit: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "ENTITY")]
    entity: String,
}

impl MetricRow {
    fn from_metric(metric: &Metric) -> Self {
        let tag = |key: &str| metric.tag(key).unwrap_or("-").to_string();
        let field = |key: &str| metric.field(key).map(render_field);

        let status = field("status")
            .or_else(|| metric.tag("status_desc").map(str::to_string))
            .unwrap_or_else(|| "-".to_string());

        Self {
            server: tag("server"),
            name: tag("name"),
            value: field("value").unwrap_or_else(|| "-".to_string()),
            unit: tag("unit"),
            status: colorize_status(&status),
            entity: tag("entity_id"),
        }
    }
}

fn render_field(value: &FieldValue) -> String {
    match value {
        FieldValue::Float(v) => v.to_string(),
        FieldValue::Int(v) => v.to_string(),
        FieldValue::Text(v) => v.clone(),
    }
}

fn colorize_status(status: &str) -> String {
    match status {
        "1" | "ok" => status.green().to_string(),
        "-" => status.to_string(),
        "cr" | "nr" | "failure_detected" | "predictive_failure" => status.red().bold().to_string(),
        _ => status.yellow().to_string(),
    }
}

/// Print metrics as a table, or as JSON lines.
pub fn print_metrics(metrics: &[Metric], json: bool) -> Result<()> {
    if json {
        for metric in metrics {
            println!("{}", metric.to_json()?);
        }
        return Ok(());
    }

    if metrics.is_empty() {
        println!("No readings");
        return Ok(());
    }

    let mut rows: Vec<MetricRow> = metrics.iter().map(MetricRow::from_metric).collect();
    rows.sort_by(|a, b| a.server.cmp(&b.server).then_with(|| a.name.cmp(&b.name)));

    let mut table = Table::new(rows);
    table.with(Style::modern());

    println!("{}", table);
    Ok(())
}
