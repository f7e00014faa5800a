//! Spreadsheet export of filtered records.

use chrono::{DateTime, Local};
use rust_xlsxwriter::{Format, Workbook};

use crate::record::{CellOut, Column, Record};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Export";

/// Write `rows` as a single-sheet workbook: header row of column labels,
/// then one row per record. Absent values leave the cell empty.
pub fn export_xlsx(columns: &[Column], rows: &[&Record]) -> Result<Vec<u8>, rust_xlsxwriter::XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, column) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, column.label(), &header_format)?;
    }

    for (idx, record) in rows.iter().enumerate() {
        let row = idx as u32 + 1;
        for (col, column) in columns.iter().enumerate() {
            let col = col as u16;
            match record.value(*column) {
                CellOut::Blank => {}
                CellOut::Text(text) => {
                    worksheet.write_string(row, col, text)?;
                }
                CellOut::Number(value) => {
                    worksheet.write_number(row, col, value)?;
                }
            }
        }
    }

    workbook.save_to_buffer()
}

/// Download name, e.g. `Service_Intello_Body Shop_Export_20240501_093000.xlsx`.
pub fn export_file_name(dataset_name: &str, at: DateTime<Local>) -> String {
    format!(
        "Service_Intello_{}_Export_{}.xlsx",
        dataset_name,
        at.format("%Y%m%d_%H%M%S")
    )
}
