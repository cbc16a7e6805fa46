//! Output formatting for geom reports.

use geomscan_core::{GeomMap, GeomOutput, ItemMap, StatusMap};

use crate::report::GeomReport;

/// Supported output formats.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

/// Formats a report in the requested output format.
pub fn format_report(report: &GeomReport, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Table => Ok(report_to_table(report)),
    }
}

fn report_to_table(report: &GeomReport) -> String {
    let mut out = match &report.geoms {
        GeomOutput::List(geoms) => list_to_table(geoms),
        GeomOutput::Status(entries) => status_to_table(entries),
    };

    for warning in &report.warnings {
        out.push_str(&format!("warning: {warning}\n"));
    }

    out
}

fn item_names(items: Option<&ItemMap>) -> String {
    match items {
        Some(items) if !items.is_empty() => items.keys().cloned().collect::<Vec<_>>().join(","),
        _ => "-".to_string(),
    }
}

fn list_to_table(geoms: &GeomMap) -> String {
    let rows: Vec<[String; 4]> = geoms
        .values()
        .map(|geom| {
            [
                geom.name().to_string(),
                geom.get("state").unwrap_or("-").to_string(),
                item_names(geom.providers.as_ref()),
                item_names(geom.consumers.as_ref()),
            ]
        })
        .collect();
    render_table(["NAME", "STATE", "PROVIDERS", "CONSUMERS"], &rows)
}

fn status_to_table(entries: &StatusMap) -> String {
    let rows: Vec<[String; 3]> = entries
        .iter()
        .map(|(device, entry)| {
            [
                device.clone(),
                entry.status.clone().unwrap_or_else(|| "N/A".to_string()),
                entry.components.clone().unwrap_or_else(|| "N/A".to_string()),
            ]
        })
        .collect();
    render_table(["NAME", "STATUS", "COMPONENTS"], &rows)
}

fn render_table<const N: usize>(headers: [&str; N], rows: &[[String; N]]) -> String {
    let mut widths = headers.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: Vec<&str>| {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    };

    push_row(headers.to_vec());
    for row in rows {
        push_row(row.iter().map(String::as_str).collect());
    }

    out
}
