//! Totals report output

pub mod csv_export;

pub use csv_export::export_report_csv;

use std::io::Write;

use colored::*;

use crate::sheet::CellValue;
use crate::storage::ResultRow;

/// One aggregated line: totals for a date, company and result group
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub date: Option<String>,
    pub company: Option<String>,
    pub results: Option<String>,
    pub total_qliq: Option<f64>,
    pub total_qoil: Option<f64>,
}

/// Error producing the report
#[derive(Debug)]
pub enum ReportError {
    /// Nothing to report; the totals query failed or the table is empty
    EmptyResult,
    /// A result row does not have the five report columns
    UnexpectedShape { row: usize, columns: usize },
    Io(std::io::Error),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::EmptyResult => write!(f, "Could not get data to output results"),
            ReportError::UnexpectedShape { row, columns } => write!(
                f,
                "Result row {} has {} columns, expected 5 (date, company, results, total_qliq, total_qoil)",
                row, columns
            ),
            ReportError::Io(e) => write!(f, "Failed to write report: {}", e),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ReportError {
    fn from(e: std::io::Error) -> Self {
        ReportError::Io(e)
    }
}

fn text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Empty => None,
        other => Some(other.to_string()),
    }
}

fn number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Int(v) => Some(*v as f64),
        CellValue::Float(v) => Some(*v),
        CellValue::Text(s) => s.trim().parse().ok(),
        CellValue::Bool(_) | CellValue::Empty => None,
    }
}

impl ReportRow {
    /// Build from a `(date, company, results, total_qliq, total_qoil)` row
    pub fn from_result(idx: usize, row: &ResultRow) -> Result<Self, ReportError> {
        let [date, company, results, total_qliq, total_qoil] = row.as_slice() else {
            return Err(ReportError::UnexpectedShape {
                row: idx,
                columns: row.len(),
            });
        };

        Ok(Self {
            date: text(date),
            company: text(company),
            results: text(results),
            total_qliq: number(total_qliq),
            total_qoil: number(total_qoil),
        })
    }
}

/// Convert raw totals rows into report rows
pub fn to_report_rows(rows: &[ResultRow]) -> Result<Vec<ReportRow>, ReportError> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| ReportRow::from_result(idx, row))
        .collect()
}

pub(crate) fn format_total(value: Option<f64>) -> String {
    match value {
        Some(v) => CellValue::Float(v).to_string(),
        None => "-".to_string(),
    }
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

/// Print one line per report row
pub fn pretty_print<W: Write>(out: &mut W, rows: &[ReportRow]) -> Result<(), ReportError> {
    if rows.is_empty() {
        return Err(ReportError::EmptyResult);
    }

    for row in rows {
        writeln!(
            out,
            "{} {}  {} {}  {} {}  {} {}  {} {}",
            "Date:".dimmed(),
            or_dash(&row.date).bright_white(),
            "Company:".dimmed(),
            or_dash(&row.company).cyan(),
            "Results:".dimmed(),
            or_dash(&row.results).yellow(),
            "Total Qliq:".dimmed(),
            format_total(row.total_qliq).green(),
            "Total Qoil:".dimmed(),
            format_total(row.total_qoil).green(),
        )?;
    }

    Ok(())
}
