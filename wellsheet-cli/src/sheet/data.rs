//! Data rows below the header region
//!
//! Rows are emitted in derived column order, not sheet order. Each derived
//! name is located in the header first: a crossed name `category_sub_leaf`
//! sits at the column whose carried-forward category and sub-category and
//! own leaf label match, a standalone name at its category's first column.

use std::collections::HashMap;

use super::header::HeaderTokens;
use super::{CellValue, GridReader, HeaderLayout};

/// One worksheet record, one cell per derived column
pub type DataRow = Vec<CellValue>;

/// Sheet column (relative to the header's first column) of every derived name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    positions: Vec<Option<usize>>,
}

impl ColumnMap {
    pub fn new(header: &HeaderTokens, columns: &[String]) -> Self {
        let (crossed, standalone) = header_positions(header);

        let positions: Vec<Option<usize>> = columns
            .iter()
            .map(|name| {
                crossed
                    .get(name)
                    .or_else(|| standalone.get(name))
                    .copied()
            })
            .collect();

        for (name, position) in columns.iter().zip(&positions) {
            match position {
                Some(idx) => log::debug!("Column '{}' reads sheet offset {}", name, idx),
                None => log::warn!("Column '{}' has no sheet column, loading NULL", name),
            }
        }

        Self { positions }
    }

    /// Reorder a sheet row into derived column order
    fn project(&self, sheet_row: &[CellValue]) -> DataRow {
        self.positions
            .iter()
            .map(|position| {
                position
                    .and_then(|idx| sheet_row.get(idx))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }
}

/// Crossed and standalone names keyed to the first sheet offset they occupy
fn header_positions(header: &HeaderTokens) -> (HashMap<String, usize>, HashMap<String, usize>) {
    let mut crossed = HashMap::new();
    let mut standalone = HashMap::new();

    let row = |n: usize| header.cells.get(n).map(Vec::as_slice).unwrap_or(&[]);
    let (categories, subs, labels) = (row(0), row(1), row(2));

    let mut category: Option<&str> = None;
    let mut sub: Option<&str> = None;
    for (idx, cell) in categories.iter().enumerate() {
        if let Some(token) = cell.as_deref() {
            category = Some(token);
            sub = None;
            standalone.entry(token.to_string()).or_insert(idx);
        }
        if let Some(token) = subs.get(idx).and_then(|cell| cell.as_deref()) {
            sub = Some(token);
        }
        let leaf = labels.get(idx).and_then(|cell| cell.as_deref());

        if let (Some(category), Some(sub), Some(leaf)) = (category, sub, leaf) {
            crossed
                .entry(format!("{}_{}_{}", category, sub, leaf))
                .or_insert(idx);
        }
    }

    (crossed, standalone)
}

/// Read every non-empty row below the header, one cell per mapped column
pub fn extract_rows<G: GridReader + ?Sized>(
    grid: &G,
    layout: &HeaderLayout,
    map: &ColumnMap,
) -> Vec<DataRow> {
    let rows = layout.data_start()..grid.height().max(layout.data_start());
    let block = grid.read_range(rows, layout.columns(grid.width()));

    let total = block.len();
    let data: Vec<DataRow> = block
        .iter()
        .map(|row| map.project(row))
        .filter(|row| row.iter().any(|cell| *cell != CellValue::Empty))
        .collect();

    if data.len() < total {
        log::debug!("Skipped {} empty data rows", total - data.len());
    }
    log::info!("Extracted {} data rows", data.len());
    data
}
