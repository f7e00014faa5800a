//! Turns a workbook into normalized records, one month sheet at a time.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use crate::error::LoadError;
use crate::headers::{ColumnLayout, HeaderMap};
use crate::normalize::{normalize_number, normalize_string, round2, safe_divide};
use crate::record::{Month, Record};
use crate::sheet_parser::{self, Cell, RawSheet};

/// Records pulled out of one workbook plus the months it covers.
#[derive(Debug, Default)]
pub struct LoadedRows {
    pub records: Vec<Record>,
    /// Months with a sheet, in fiscal order.
    pub months: Vec<Month>,
}

/// Read a workbook from disk and extract every month sheet.
pub fn load_workbook(path: &Path) -> Result<LoadedRows, LoadError> {
    if !path.exists() {
        return Err(LoadError::SourceMissing(path.to_path_buf()));
    }

    let data = std::fs::read(path)?;
    let filename = path.to_string_lossy();
    let sheets = sheet_parser::parse_file(&filename, &data)?;
    Ok(extract_records(&sheets))
}

/// Extract records from already-parsed sheets. Non-month sheets are ignored.
pub fn extract_records(sheets: &[RawSheet]) -> LoadedRows {
    let mut records = Vec::new();
    let mut present = BTreeSet::new();

    for sheet in sheets {
        let Some(month) = Month::detect(&sheet.name) else {
            debug!("Sheet '{}' is not a month sheet, skipping", sheet.name);
            continue;
        };
        present.insert(month);

        let Some((header, body)) = sheet.rows.split_first() else {
            continue;
        };

        let header_map = HeaderMap::build(header);
        let layout = ColumnLayout::resolve(&header_map);
        debug!(
            "Sheet '{}' ({}, {:?}): {} headers, columns {:?}",
            sheet.name,
            month.label(),
            sheet.source_type,
            header_map.len(),
            layout
        );

        let before = records.len();
        records.extend(
            body.iter()
                .filter(|row| !row.is_empty())
                .map(|row| build_record(month, &layout, row))
                .filter(|rec| !rec.is_noise()),
        );
        debug!("Sheet '{}': {} records", sheet.name, records.len() - before);
    }

    LoadedRows {
        records,
        months: present.into_iter().collect(),
    }
}

fn cell<'a>(row: &'a [Cell], idx: Option<usize>) -> &'a Cell {
    idx.and_then(|i| row.get(i)).unwrap_or(&Cell::Empty)
}

/// OSAT reported as a fraction (0..=1) is scaled to a percentage.
pub fn normalize_osat(raw: Option<f64>) -> Option<f64> {
    match raw {
        Some(v) if (0.0..=1.0).contains(&v) => round2(Some(v * 100.0)),
        other => round2(other),
    }
}

pub fn percent_of_response(response: Option<f64>, links: Option<f64>) -> Option<f64> {
    safe_divide(response, links).and_then(|ratio| round2(Some(ratio * 100.0)))
}

fn build_record(month: Month, layout: &ColumnLayout, row: &[Cell]) -> Record {
    let links = normalize_number(cell(row, layout.links_triggered));
    let response = normalize_number(cell(row, layout.response));

    Record {
        month,
        sa_name: normalize_string(cell(row, layout.advisor_name)),
        division: normalize_string(cell(row, layout.division)),
        mile_id: normalize_string(cell(row, layout.mile_id)),
        links_triggered: links,
        response,
        nps: normalize_number(cell(row, layout.nps)),
        percent_response: percent_of_response(response, links),
        concern_count: normalize_number(cell(row, layout.concern_count)),
        cc_per_1000: normalize_number(cell(row, layout.cc_per_1000)),
        osat: normalize_osat(normalize_number(cell(row, layout.osat))),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sheet_parser::SourceType;
    use rust_xlsxwriter::Workbook;

    pub(crate) const HEADER: [&str; 10] = [
        "Mile id",
        "SA Name",
        "Division",
        "Links Triggered",
        "Response",
        "NPS",
        "Concern Count",
        "CC/1000",
        "OSAT",
        "Remarks",
    ];

    /// Write a workbook where each sheet is (name, header, rows of optional strings/numbers).
    pub(crate) fn write_workbook(path: &Path, sheets: &[(&str, &[&str], Vec<Vec<Cell>>)]) {
        let mut workbook = Workbook::new();
        for (name, header, rows) in sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(*name).unwrap();
            for (col, h) in header.iter().enumerate() {
                worksheet.write_string(0, col as u16, *h).unwrap();
            }
            for (r, row) in rows.iter().enumerate() {
                for (c, value) in row.iter().enumerate() {
                    let (r, c) = (r as u32 + 1, c as u16);
                    match value {
                        Cell::Empty => {}
                        Cell::Text(s) => {
                            worksheet.write_string(r, c, s).unwrap();
                        }
                        Cell::Number(n) => {
                            worksheet.write_number(r, c, *n).unwrap();
                        }
                        Cell::Bool(b) => {
                            worksheet.write_boolean(r, c, *b).unwrap();
                        }
                    }
                }
            }
        }
        workbook.save(path).unwrap();
    }

    pub(crate) fn t(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    pub(crate) fn n(v: f64) -> Cell {
        Cell::Number(v)
    }

    fn sheet(name: &str, rows: Vec<Vec<Cell>>) -> RawSheet {
        RawSheet {
            name: name.to_string(),
            rows,
            source_type: SourceType::Excel,
        }
    }

    #[test]
    fn test_osat_normalization() {
        assert_eq!(normalize_osat(Some(0.85)), Some(85.0));
        assert_eq!(normalize_osat(Some(85.0)), Some(85.0));
        assert_eq!(normalize_osat(Some(1.5)), Some(1.5));
        assert_eq!(normalize_osat(Some(1.0)), Some(100.0));
        assert_eq!(normalize_osat(None), None);
        assert_eq!(normalize_osat(Some(1.125)), Some(1.12));
    }

    #[test]
    fn test_percent_of_response() {
        assert_eq!(percent_of_response(Some(50.0), Some(200.0)), Some(25.0));
        assert_eq!(percent_of_response(Some(1.0), Some(3.0)), Some(33.33));
        assert_eq!(percent_of_response(Some(5.0), Some(0.0)), None);
        assert_eq!(percent_of_response(None, Some(10.0)), None);
    }

    #[test]
    fn test_extract_skips_non_month_and_noise() {
        let header: Vec<Cell> = vec![t("SA Name"), t("Branch"), t("Links Triggered"), t("Response")];
        let sheets = vec![
            sheet("Notes", vec![header.clone(), vec![t("X"), t("Y"), n(1.0), n(1.0)]]),
            sheet(
                "May 2024",
                vec![
                    header.clone(),
                    vec![t("Ravi"), t("Pune"), n(200.0), n(50.0)],
                    vec![Cell::Empty, Cell::Empty, t("NA"), t("-")],
                    vec![],
                ],
            ),
            sheet("April", vec![header, vec![t(" Asha "), Cell::Empty, t("1,000"), n(100.0)]]),
        ];

        let loaded = extract_records(&sheets);
        assert_eq!(loaded.months, vec![Month::Apr, Month::May]);
        assert_eq!(loaded.records.len(), 2);

        let ravi = &loaded.records[0];
        assert_eq!(ravi.month, Month::May);
        assert_eq!(ravi.division.as_deref(), Some("Pune"));
        assert_eq!(ravi.percent_response, Some(25.0));

        let asha = &loaded.records[1];
        assert_eq!(asha.sa_name.as_deref(), Some("Asha"));
        assert_eq!(asha.links_triggered, Some(1000.0));
        assert_eq!(asha.percent_response, Some(10.0));
    }

    #[test]
    fn test_empty_month_sheet_still_counts_as_present() {
        let sheets = vec![sheet("Jun", vec![]), sheet("Jul", vec![vec![t("SA Name")]])];
        let loaded = extract_records(&sheets);
        assert!(loaded.records.is_empty());
        assert_eq!(loaded.months, vec![Month::Jun, Month::Jul]);
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let sheets = vec![sheet(
            "Aug",
            vec![
                vec![t("SA Name"), t("Division"), t("OSAT")],
                vec![t("Meena")],
            ],
        )];
        let loaded = extract_records(&sheets);
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].osat, None);
        assert_eq!(loaded.records[0].division, None);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_workbook(&dir.path().join("nope.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::SourceMissing(_)));
        assert!(err.to_string().starts_with("Excel file not found"));
    }

    #[test]
    fn test_load_corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"definitely not a workbook").unwrap();
        let err = load_workbook(&path).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_load_real_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Link Triggered.xlsx");
        write_workbook(
            &path,
            &[
                (
                    "Apr",
                    &HEADER[..],
                    vec![vec![
                        t("M-1"),
                        t("Ravi"),
                        t("Pune"),
                        n(200.0),
                        n(50.0),
                        n(60.0),
                        n(2.0),
                        n(10.0),
                        n(0.9),
                        t("ok"),
                    ]],
                ),
                ("Summary", &["Total"][..], vec![vec![n(1.0)]]),
            ],
        );

        let loaded = load_workbook(&path).unwrap();
        assert_eq!(loaded.months, vec![Month::Apr]);
        assert_eq!(loaded.records.len(), 1);
        let rec = &loaded.records[0];
        assert_eq!(rec.mile_id.as_deref(), Some("M-1"));
        assert_eq!(rec.nps, Some(60.0));
        assert_eq!(rec.osat, Some(90.0));
        assert_eq!(rec.cc_per_1000, Some(10.0));
        assert_eq!(rec.percent_response, Some(25.0));
    }
}
