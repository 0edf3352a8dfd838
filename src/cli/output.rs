//! Output formatting helpers for CLI commands

use crate::api::{ServiceRecord, ServiceStatus};
use crate::metrics::{ChartPoint, EndpointTable, LiveMetrics, RollingWindow};
use crate::push::ConnectionState;
use crate::session::Identity;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use serde_json::json;

const SPARK_BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

fn status_colored(status: ServiceStatus) -> String {
    match status {
        ServiceStatus::Healthy => "Healthy".green().to_string(),
        ServiceStatus::Down => "Down".red().to_string(),
        ServiceStatus::Unknown => "Unknown".yellow().to_string(),
    }
}

/// Get status icon for service status
pub fn status_icon(status: ServiceStatus) -> &'static str {
    match status {
        ServiceStatus::Healthy => "✓",
        ServiceStatus::Down => "✗",
        ServiceStatus::Unknown => "?",
    }
}

/// Format services as a table
pub fn format_services_table(services: &[ServiceRecord]) -> String {
    if services.is_empty() {
        return "No services yet. Add one with `watchtower services add`.".to_string();
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Name", "URL", "Status", "Metrics"]);

    for s in services {
        table.add_row(vec![
            Cell::new(&s.id),
            Cell::new(s.display_name()),
            Cell::new(&s.url),
            Cell::new(status_colored(s.status)),
            Cell::new(s.metrics.join(", ")),
        ]);
    }

    table.to_string()
}

/// Format services as JSON
pub fn format_services_json(services: &[ServiceRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "services": services }))
}

pub fn format_identity(identity: &Identity) -> String {
    format!(
        "{} <{}> (user id {})",
        identity.username.bold(),
        identity.email,
        identity.userid
    )
}

/// Title line of the watch view.
pub fn format_detail_header(service: &ServiceRecord) -> String {
    format!(
        "{} {}  {}  {}",
        status_icon(service.status),
        service.display_name().bold(),
        service.url.dimmed(),
        status_colored(service.status)
    )
}

pub fn format_connection_state(state: &ConnectionState) -> String {
    let label = state.to_string();
    match state {
        ConnectionState::Open => label.green().to_string(),
        ConnectionState::Connecting => label.cyan().to_string(),
        ConnectionState::Retrying { .. } => label.yellow().to_string(),
        ConnectionState::Closed => label.red().to_string(),
    }
}

/// One bar per point, scaled between the window's min and max.
pub fn sparkline(values: &[f64]) -> String {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let Some(min) = finite.iter().copied().reduce(f64::min) else {
        return String::new();
    };
    let max = finite.iter().copied().fold(min, f64::max);
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if !v.is_finite() {
                ' '
            } else if span == 0.0 {
                SPARK_BARS[SPARK_BARS.len() / 2]
            } else {
                let idx = ((v - min) / span * (SPARK_BARS.len() - 1) as f64).round() as usize;
                SPARK_BARS[idx.min(SPARK_BARS.len() - 1)]
            }
        })
        .collect()
}

/// Chart series as a sparkline plus its most recent value.
pub fn format_series(title: &str, window: &RollingWindow<ChartPoint>) -> String {
    let values: Vec<f64> = window.iter().map(|p| p.value).collect();
    match window.latest() {
        Some(latest) => format!(
            "{:<14} {:<width$}  {} @ {}",
            title,
            sparkline(&values),
            format_value(latest.value).bold(),
            latest.time,
            width = window.capacity()
        ),
        None => format!("{:<14} {}", title, "waiting for data".dimmed()),
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Format the endpoint request/error table
pub fn format_endpoint_table(endpoints: &EndpointTable) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Endpoint", "Requests", "Errors"]);

    for row in endpoints.rows() {
        let errors = if row.error_count > 0.0 {
            format_value(row.error_count).red().to_string()
        } else {
            format_value(row.error_count)
        };
        table.add_row(vec![
            Cell::new(&row.endpoint),
            Cell::new(format_value(row.request_count)).set_alignment(CellAlignment::Right),
            Cell::new(errors).set_alignment(CellAlignment::Right),
        ]);
    }

    table.to_string()
}

/// Full text rendering of the live view.
pub fn render_live(live: &LiveMetrics) -> String {
    let mut out = String::new();
    out.push_str(&format_series("Active Users", live.active_users()));
    out.push('\n');
    out.push_str(&format_series("Memory Usage", live.memory_usage()));
    out.push('\n');
    if live.endpoints().is_empty() {
        out.push_str(&"No endpoint data".dimmed().to_string());
    } else {
        out.push_str(&format_endpoint_table(live.endpoints()));
    }
    out
}

/// Single-line JSON snapshot of the live view.
pub fn format_live_json(live: &LiveMetrics) -> Result<String, serde_json::Error> {
    serde_json::to_string(&live.snapshot())
}
