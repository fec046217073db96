//! CSV export of the totals report

use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;

use super::{ReportRow, format_total};

/// Write report rows to a CSV file with a header line
pub fn export_report_csv(rows: &[ReportRow], path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    wtr.write_record(["date", "company", "results", "total_qliq", "total_qoil"])
        .context("Failed to write CSV header")?;

    for row in rows {
        let total_qliq = optional_total(row.total_qliq);
        let total_qoil = optional_total(row.total_qoil);
        wtr.write_record([
            row.date.as_deref().unwrap_or_default(),
            row.company.as_deref().unwrap_or_default(),
            row.results.as_deref().unwrap_or_default(),
            total_qliq.as_str(),
            total_qoil.as_str(),
        ])
        .context("Failed to write report row")?;
    }

    wtr.flush().context("Failed to flush CSV writer")?;

    log::info!("CSV report exported to: {}", path.display());
    Ok(())
}

fn optional_total(value: Option<f64>) -> String {
    value.map(|v| format_total(Some(v))).unwrap_or_default()
}
