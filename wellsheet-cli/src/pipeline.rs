//! Workbook to database load
//!
//! Steps, in order:
//! 1. decode the header and derive the column order
//! 2. drop and recreate the table
//! 3. insert the data rows
//! 4. add the date column and backfill one generated date per row
//! 5. run the totals query

use anyhow::{Context, Result, bail};

use crate::config::LoadConfig;
use crate::fields::{DateFieldsGenerator, FieldsGenerator};
use crate::report::{ReportRow, to_report_rows};
use crate::sheet::{
    ColumnMap, DataRow, GridReader, HeaderError, XlsxGrid, decode_header, derive_column_names,
    extract_rows,
};
use crate::storage::{
    DatabaseConnector, QueryExecutor, ResultRow, StorageError, TablePlan, TotalsPlan,
};

/// Schema and rows read from a worksheet, ready to be stored.
///
/// Every row holds one value per plan column, in plan column order.
#[derive(Debug, Clone)]
pub struct PreparedLoad {
    pub plan: TablePlan,
    pub rows: Vec<DataRow>,
}

/// Read the schema and data rows from a grid
pub fn prepare<G: GridReader + ?Sized>(
    grid: &G,
    config: &LoadConfig,
) -> Result<PreparedLoad, HeaderError> {
    let layout = config.header_layout();
    let header = decode_header(grid, &layout)?;
    let columns = derive_column_names(&header, &config.exclude_set())?;
    let rows = extract_rows(grid, &layout, &ColumnMap::new(&header, &columns));

    Ok(PreparedLoad {
        plan: TablePlan::new(config.table.clone(), columns),
        rows,
    })
}

/// Store a prepared load and return the raw totals rows.
///
/// Statement failures follow the executor's failure policy; a swallowed
/// failure of the totals query yields no rows.
pub async fn load_into<E: QueryExecutor + ?Sized>(
    executor: &mut E,
    prepared: &PreparedLoad,
    totals: &TotalsPlan,
    dates: &mut dyn FieldsGenerator,
) -> Result<Vec<ResultRow>, StorageError> {
    let plan = &prepared.plan;

    executor.execute(&plan.drop_statement()).await?;
    executor.execute(&plan.create_statement()).await?;
    executor
        .execute_batch(&plan.insert_statement(), &prepared.rows)
        .await?;
    log::info!(
        "Inserted {} rows into '{}'",
        prepared.rows.len(),
        plan.table()
    );

    executor.execute(&plan.add_date_column_statement()).await?;
    let generated = dates.generate_fields(prepared.rows.len());
    executor
        .execute_batch(&plan.backfill_date_statement(), &generated)
        .await?;
    log::info!("Backfilled {} dates", generated.len());

    let rows = executor
        .execute(&totals.statement(plan.table()))
        .await?
        .unwrap_or_default();
    log::info!("Totals query returned {} rows", rows.len());
    Ok(rows)
}

/// Run a full load as configured and return the report rows
pub async fn run_load(config: &LoadConfig) -> Result<Vec<ReportRow>> {
    config.validate()?;

    let grid = XlsxGrid::open(&config.source, config.sheet.as_deref())?;
    let prepared = prepare(&grid, config)
        .with_context(|| format!("Failed to read schema from {}", config.source.display()))?;
    if prepared.plan.columns().is_empty() {
        bail!(
            "Header of sheet '{}' defines no columns",
            grid.sheet_name()
        );
    }

    let totals = TotalsPlan::new(&prepared.plan, &config.report)
        .context("Failed to plan the totals report")?;
    let mut dates = DateFieldsGenerator::new(&config.dates)?;

    let connector = DatabaseConnector::new(config.database.clone(), config.failure_policy);
    let mut storage = connector.connect().await?;
    log::debug!("Failure policy: {:?}", storage.policy());

    let outcome = load_into(&mut storage, &prepared, &totals, &mut dates).await;
    storage.close().await;

    let rows = outcome.with_context(|| format!("Load into '{}' failed", connector.database()))?;
    Ok(to_report_rows(&rows)?)
}
