//! Write a sample workbook in the layout the loader expects

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

/// Result groups laid out side by side after the company column
const RESULT_GROUPS: [&str; 2] = ["fact", "forecast"];
const MEASURES: [&str; 2] = ["Qliq", "Qoil"];
const LABELS: [&str; 2] = ["data1", "data2"];

/// Sample records: company, then fact and forecast values in sheet order
const SAMPLE_ROWS: [(&str, [f64; 8]); 3] = [
    ("company1", [10.0, 15.0, 50.0, 20.0, 12.0, 14.0, 44.0, 21.0]),
    ("company1", [11.0, 12.0, 42.0, 23.0, 13.0, 11.0, 40.0, 25.0]),
    ("company2", [9.0, 16.0, 31.0, 18.0, 10.0, 15.0, 33.0, 17.0]),
];

/// Write the template workbook to `path`
pub fn write_template(path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("wells")?;

    let header_format = Format::new().set_bold();

    // Column A stays free; the header starts in column B
    worksheet.write_string_with_format(0, 1, "company", &header_format)?;

    let mut col: u16 = 2;
    for group in RESULT_GROUPS {
        worksheet.write_string_with_format(0, col, group, &header_format)?;
        for measure in MEASURES {
            worksheet.write_string_with_format(1, col, measure, &header_format)?;
            for label in LABELS {
                worksheet.write_string_with_format(2, col, label, &header_format)?;
                col += 1;
            }
        }
    }

    for (idx, (company, values)) in SAMPLE_ROWS.iter().enumerate() {
        let row = (idx + 3) as u32;
        worksheet.write_number(row, 0, (idx + 1) as f64)?;
        worksheet.write_string(row, 1, *company)?;
        for (offset, value) in values.iter().enumerate() {
            worksheet.write_number(row, 2 + offset as u16, *value)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

    log::info!("Template written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{
        CellValue, ColumnMap, ExcludeSet, GridReader, HeaderLayout, XlsxGrid, decode_header,
        derive_column_names, extract_rows,
    };

    #[test]
    fn test_template_round_trips_through_header_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.xlsx");

        write_template(&path).unwrap();

        let grid = XlsxGrid::open(&path, None).unwrap();
        assert_eq!(grid.sheet_name(), "wells");
        assert_eq!(grid.width(), 10);

        let layout = HeaderLayout::default();
        let header = decode_header(&grid, &layout).unwrap();
        let columns = derive_column_names(&header, &ExcludeSet::new(["company"])).unwrap();

        assert_eq!(columns.len(), 9);
        assert_eq!(columns[0], "company");
        assert_eq!(columns[1], "fact_Qliq_data1");
        assert_eq!(columns[8], "forecast_Qoil_data2");

        let rows = extract_rows(&grid, &layout, &ColumnMap::new(&header, &columns));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].len(), 9);
        assert_eq!(rows[0][0], CellValue::Text("company1".to_string()));
        assert_eq!(rows[0][1], CellValue::Float(10.0));
    }
}
