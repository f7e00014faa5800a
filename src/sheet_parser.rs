//! Tabular source: reads CSV and Excel (.xlsx/.xlsm/.xlsb) files into named
//! sheets of raw cells.
//!
//! Cells keep their natural type (text, number, bool or empty); interpreting
//! them is left to the loader.

use anyhow::{Context, Result};
use calamine::{open_workbook_from_rs, Data, Reader, Xlsb, Xlsx};
use std::io::Cursor;

/// Source type of the parsed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Csv,
    Excel,
}

/// A raw cell value as stored in the file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Text rendering of the cell, `None` for empty cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(f) => Some(format_number(*f)),
            Cell::Bool(true) => Some("True".to_string()),
            Cell::Bool(false) => Some("False".to_string()),
        }
    }
}

/// One worksheet. The first row, if any, is the header row.
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
    pub source_type: SourceType,
}

/// Dispatch file parsing by extension.
pub fn parse_file(filename: &str, data: &[u8]) -> Result<Vec<RawSheet>> {
    let ext = filename
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => parse_csv(filename, data),
        "xlsx" | "xlsm" => parse_excel_xlsx(data),
        "xlsb" => parse_excel_xlsb(data),
        _ => anyhow::bail!(
            "Unsupported file type: .{}. Supported: .csv, .xlsx, .xlsm, .xlsb",
            ext
        ),
    }
}

/// Parse a CSV file into a single sheet named after the file stem.
fn parse_csv(filename: &str, data: &[u8]) -> Result<Vec<RawSheet>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(data);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.context("Failed to read CSV record")?;
        let row: Vec<Cell> = record
            .iter()
            .map(|f| {
                if f.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(f.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    let name = filename
        .rsplit('/')
        .next()
        .unwrap_or(filename)
        .rsplit('\\')
        .next()
        .unwrap_or(filename);
    let name = match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    };

    Ok(vec![RawSheet {
        name: name.to_string(),
        rows,
        source_type: SourceType::Csv,
    }])
}

/// Parse an xlsx/xlsm file. Every worksheet becomes a RawSheet, empty ones included.
fn parse_excel_xlsx(data: &[u8]) -> Result<Vec<RawSheet>> {
    let cursor = Cursor::new(data);
    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(cursor).context("Failed to open Excel workbook")?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::new();

    for name in &sheet_names {
        match workbook.worksheet_range(name) {
            Ok(range) => sheets.push(range_to_raw_sheet(name, &range)),
            Err(e) => tracing::warn!("Skipping sheet '{}': {}", name, e),
        }
    }

    Ok(sheets)
}

/// Parse an xlsb file.
fn parse_excel_xlsb(data: &[u8]) -> Result<Vec<RawSheet>> {
    let cursor = Cursor::new(data);
    let mut workbook: Xlsb<_> =
        open_workbook_from_rs(cursor).context("Failed to open Excel workbook")?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::new();

    for name in &sheet_names {
        match workbook.worksheet_range(name) {
            Ok(range) => sheets.push(range_to_raw_sheet(name, &range)),
            Err(e) => tracing::warn!("Skipping sheet '{}': {}", name, e),
        }
    }

    Ok(sheets)
}

fn range_to_raw_sheet(name: &str, range: &calamine::Range<Data>) -> RawSheet {
    // calamine ranges begin at the first used cell; pad back to A1 so row 0
    // is always the sheet's first physical row.
    let (first_row, first_col) = range.start().unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); first_row as usize];
    rows.extend(range.rows().map(|row| {
        std::iter::repeat(Cell::Empty)
            .take(first_col as usize)
            .chain(row.iter().map(convert_cell))
            .collect()
    }));

    RawSheet {
        name: name.to_string(),
        rows,
        source_type: SourceType::Excel,
    }
}

/// Convert a calamine cell into a raw cell.
fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Text(excel_serial_to_string(dt.as_f64())),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

/// Render a number the way it reads in the sheet: no trailing ".0" on whole numbers.
fn format_number(f: f64) -> String {
    if f.is_finite() && f == f.trunc() && f.abs() < i64::MAX as f64 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

/// Convert an Excel serial date number to a human-readable string.
/// Excel epoch: 1899-12-30 (with the 1900 leap year bug — day 60 is "Feb 29, 1900" which doesn't exist).
fn excel_serial_to_string(serial: f64) -> String {
    let days = serial as i64;
    let frac = serial - days as f64;

    let adjusted_days = if days > 59 { days - 1 } else { days };

    let base = 25568i64; // adjusted serial of 1970-01-01
    let unix_days = adjusted_days - base;
    let total_secs = unix_days * 86400 + (frac * 86400.0).round() as i64;

    let days_since_epoch = total_secs.div_euclid(86400);
    let time_of_day = total_secs.rem_euclid(86400);

    let hours = time_of_day / 3600;
    let minutes = (time_of_day % 3600) / 60;
    let seconds = time_of_day % 60;

    let date = chrono::NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(days_since_epoch)));

    let Some(date) = date else {
        return format!("{}", serial);
    };

    if hours == 0 && minutes == 0 && seconds == 0 {
        date.format("%Y-%m-%d").to_string()
    } else {
        format!(
            "{} {:02}:{:02}:{:02}",
            date.format("%Y-%m-%d"),
            hours,
            minutes,
            seconds
        )
    }
}
