//! Columns command handler: show the schema a workbook header produces

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;

use super::ColumnsCommands;
use crate::config::LoadConfig;
use crate::pipeline::prepare;
use crate::sheet::XlsxGrid;
use crate::storage::TablePlan;

#[derive(Debug, Serialize)]
struct ColumnSummary<'a> {
    name: &'a str,
    sql_type: &'static str,
}

#[derive(Debug, Serialize)]
struct SchemaSummary<'a> {
    source: String,
    sheet: &'a str,
    table: &'a str,
    columns: Vec<ColumnSummary<'a>>,
    data_rows: usize,
}

pub fn handle_columns_command(args: ColumnsCommands, mut config: LoadConfig) -> Result<()> {
    args.apply(&mut config);

    let grid = XlsxGrid::open(&config.source, config.sheet.as_deref())?;
    let prepared = prepare(&grid, &config)
        .with_context(|| format!("Failed to read schema from {}", config.source.display()))?;

    let summary = SchemaSummary {
        source: config.source.display().to_string(),
        sheet: grid.sheet_name(),
        table: prepared.plan.table(),
        columns: prepared
            .plan
            .columns()
            .iter()
            .map(|name| ColumnSummary {
                name,
                sql_type: TablePlan::column_type(name),
            })
            .collect(),
        data_rows: prepared.rows.len(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} {} ({})",
        "Sheet:".dimmed(),
        summary.sheet.bright_white(),
        summary.source
    );
    for column in &summary.columns {
        println!("  {:<32} {}", column.name.cyan(), column.sql_type.dimmed());
    }
    println!(
        "{} columns, {} data rows",
        summary.columns.len().to_string().green(),
        summary.data_rows.to_string().green()
    );
    Ok(())
}
