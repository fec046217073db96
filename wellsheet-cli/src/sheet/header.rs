//! Header region decoding
//!
//! The schema lives in a fixed three-row header:
//! - row 0: top-level categories (`company`, `fact`, `forecast`), each
//!   followed by empty cells for the columns it spans
//! - row 1: sub-categories (`Qliq`, `Qoil`)
//! - row 2: leaf labels (`data1`, `data2`)

use std::collections::HashMap;
use std::ops::Range;

use super::{CellValue, GridReader};

/// Number of rows in the header region
pub const HEADER_ROWS: usize = 3;

/// Where the header region sits in the worksheet (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    pub first_row: usize,
    pub first_column: usize,
}

impl Default for HeaderLayout {
    /// Header in Excel rows 1-3, starting at column B
    fn default() -> Self {
        Self {
            first_row: 0,
            first_column: 1,
        }
    }
}

impl HeaderLayout {
    pub fn header_rows(&self) -> Range<usize> {
        self.first_row..self.first_row + HEADER_ROWS
    }

    /// First data row, right below the header
    pub fn data_start(&self) -> usize {
        self.first_row + HEADER_ROWS
    }

    /// Column range covered by the header for a grid of the given width
    pub fn columns(&self, width: usize) -> Range<usize> {
        self.first_column..width.max(self.first_column)
    }
}

/// Error raised when the header region cannot describe a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// The sheet ends before all header rows
    MissingRows { expected: usize, found: usize },
    /// A first-row category has no recorded column span
    UnknownCategory { category: String },
}

impl std::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderError::MissingRows { expected, found } => write!(
                f,
                "Malformed header: expected {} header rows, found {}",
                expected, found
            ),
            HeaderError::UnknownCategory { category } => write!(
                f,
                "Malformed header: category '{}' has no column span",
                category
            ),
        }
    }
}

impl std::error::Error for HeaderError {}

/// Tokens of the three header rows plus the span of every category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTokens {
    /// Non-empty tokens of each header row, left to right
    pub rows: Vec<Vec<String>>,
    /// Category token -> number of columns it spans in the first row
    pub category_counts: HashMap<String, usize>,
    /// Token of every header cell by column, `None` for empty cells
    pub cells: Vec<Vec<Option<String>>>,
}

impl HeaderTokens {
    pub fn new(rows: Vec<Vec<String>>, category_counts: HashMap<String, usize>) -> Self {
        Self {
            rows,
            category_counts,
            cells: Vec::new(),
        }
    }

    /// Attach the positional header cells the tokens were read from
    pub fn with_cells(mut self, cells: Vec<Vec<Option<String>>>) -> Self {
        self.cells = cells;
        self
    }

    pub fn categories(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Walk the header region of `grid` and collect its tokens and category spans
pub fn decode_header<G: GridReader + ?Sized>(
    grid: &G,
    layout: &HeaderLayout,
) -> Result<HeaderTokens, HeaderError> {
    let available = grid.height().saturating_sub(layout.first_row);
    if available < HEADER_ROWS {
        return Err(HeaderError::MissingRows {
            expected: HEADER_ROWS,
            found: available,
        });
    }

    let block = grid.read_range(layout.header_rows(), layout.columns(grid.width()));

    let mut category_counts: HashMap<String, usize> = HashMap::new();
    let mut current: Option<String> = None;
    for cell in &block[0] {
        match cell.as_token() {
            Some(token) => {
                category_counts.insert(token.clone(), 1);
                current = Some(token);
            }
            None => {
                if let Some(category) = &current {
                    *category_counts.entry(category.clone()).or_insert(0) += 1;
                }
            }
        }
    }

    let cells: Vec<Vec<Option<String>>> = block
        .iter()
        .map(|row| row.iter().map(CellValue::as_token).collect())
        .collect();
    let rows: Vec<Vec<String>> = cells
        .iter()
        .map(|row| row.iter().flatten().cloned().collect())
        .collect();

    log::info!(
        "Decoded header: {} categories, {} sub-categories, {} labels",
        rows[0].len(),
        rows[1].len(),
        rows[2].len()
    );
    log::debug!("Category spans: {:?}", category_counts);

    Ok(HeaderTokens::new(rows, category_counts).with_cells(cells))
}
