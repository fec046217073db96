//! Worksheet access, header decoding and column derivation

pub mod cell;
pub mod columns;
pub mod data;
pub mod grid;
pub mod header;
pub mod template;

pub use cell::CellValue;
pub use columns::{ExcludeSet, derive_column_names};
pub use data::{ColumnMap, DataRow, extract_rows};
pub use grid::{GridReader, XlsxGrid};
pub use header::{HeaderError, HeaderLayout, decode_header};
pub use template::write_template;

#[cfg(test)]
pub use grid::MemoryGrid;
