//! Rectangular cell grids backed by a worksheet

use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Range as SheetRange, Reader, Xlsx, open_workbook};

use super::CellValue;

/// Read access to a grid of cells addressed by 0-based row/column indices
pub trait GridReader {
    /// Number of rows, counted from row 0
    fn height(&self) -> usize;

    /// Number of columns, counted from column 0
    fn width(&self) -> usize;

    /// Single cell, `Empty` when outside the used area
    fn cell(&self, row: usize, col: usize) -> CellValue;

    /// Read a block of cells. The result always has `rows.len()` rows of
    /// `cols.len()` cells; positions outside the grid come back as `Empty`.
    fn read_range(&self, rows: Range<usize>, cols: Range<usize>) -> Vec<Vec<CellValue>> {
        rows.map(|row| cols.clone().map(|col| self.cell(row, col)).collect())
            .collect()
    }
}

/// Grid over one worksheet of an xlsx workbook
pub struct XlsxGrid {
    sheet_name: String,
    range: SheetRange<Data>,
}

impl XlsxGrid {
    /// Open a workbook and load a worksheet (the first one when `sheet` is `None`)
    pub fn open(path: &Path, sheet: Option<&str>) -> Result<Self> {
        let mut workbook: Xlsx<_> = open_workbook(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

        let sheet_name = match sheet {
            Some(name) => name.to_string(),
            None => workbook
                .sheet_names()
                .first()
                .context("Excel file has no sheets")?
                .clone(),
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        log::info!(
            "Opened sheet '{}' from {} ({} rows x {} columns)",
            sheet_name,
            path.display(),
            range.end().map(|(r, _)| r + 1).unwrap_or(0),
            range.end().map(|(_, c)| c + 1).unwrap_or(0)
        );

        Ok(Self { sheet_name, range })
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }
}

impl GridReader for XlsxGrid {
    // calamine ranges start at the first used cell; `end()` and
    // `get_value()` work in absolute coordinates.
    fn height(&self) -> usize {
        self.range.end().map(|(r, _)| r as usize + 1).unwrap_or(0)
    }

    fn width(&self) -> usize {
        self.range.end().map(|(_, c)| c as usize + 1).unwrap_or(0)
    }

    fn cell(&self, row: usize, col: usize) -> CellValue {
        let (Ok(row), Ok(col)) = (u32::try_from(row), u32::try_from(col)) else {
            return CellValue::Empty;
        };
        self.range
            .get_value((row, col))
            .map(CellValue::from)
            .unwrap_or_default()
    }
}

/// In-memory grid, used for fixtures
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryGrid {
    rows: Vec<Vec<CellValue>>,
}

#[cfg(test)]
impl MemoryGrid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Build a grid from text cells, `""` meaning empty
    pub fn from_text(rows: &[&[&str]]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|s| CellValue::from(*s)).collect())
                .collect(),
        )
    }
}

#[cfg(test)]
impl GridReader for MemoryGrid {
    fn height(&self) -> usize {
        self.rows.len()
    }

    fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell(&self, row: usize, col: usize) -> CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_range_pads_outside_cells() {
        let grid = MemoryGrid::from_text(&[&["a", "b"], &["c"]]);

        let block = grid.read_range(0..3, 1..3);

        assert_eq!(block.len(), 3);
        assert_eq!(block[0], vec![CellValue::from("b"), CellValue::Empty]);
        assert_eq!(block[1], vec![CellValue::Empty, CellValue::Empty]);
        assert_eq!(block[2], vec![CellValue::Empty, CellValue::Empty]);
    }

    #[test]
    fn test_memory_grid_dimensions() {
        let grid = MemoryGrid::from_text(&[&["a"], &["b", "c", "d"]]);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.width(), 3);
    }
}
