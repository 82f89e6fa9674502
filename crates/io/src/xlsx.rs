// Excel import (xlsx, xlsm, xls, xlsb, ods) and result export (xlsx only)
//
// Import: one sheet becomes a header + rows table of text cells.
// Export: presentation snapshot of the reconciliation, not a round-trip format.

use std::path::{Path, PathBuf};
use std::time::Instant;

use bomcheck_recon::model::{dedupe_headers, Cell, Table, FLAG_COLUMNS};
use calamine::{open_workbook_auto, Data, Range, Reader};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook as XlsxWorkbook, Worksheet};

use crate::error::IoError;

pub const RESULT_SHEET: &str = "Validation Result";
pub const MERGED_SHEET: &str = "Merged BOM";

const HEADER_FILL: u32 = 0x1F4E78;
const HEADER_FONT: u32 = 0xFFFFFF;
const FLAG_FILL: u32 = 0xFFC7CE;
const FLAG_FONT: u32 = 0x9C0006;

// ============================================================================
// Import
// ============================================================================

/// Render one spreadsheet cell as text. Empty cells and empty strings are null.
pub fn cell_text(cell: &Data) -> Cell {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Data::Float(n) => Some(format_number(*n)),
        Data::Int(n) => Some(n.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Some(format!("#{:?}", e)),
        Data::DateTime(dt) => Some(match dt.as_datetime() {
            Some(ts) if ts.time() == chrono::NaiveTime::MIN => ts.date().format("%Y-%m-%d").to_string(),
            Some(ts) => ts.format("%Y-%m-%dT%H:%M:%S").to_string(),
            None => format_number(dt.as_f64()),
        }),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Integers without decimals, everything else in shortest round-trip form.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Header text for column `index`; blank headers get a positional placeholder.
pub fn header_name(raw: &str, index: usize) -> String {
    if raw.is_empty() {
        format!("Unnamed: {index}")
    } else {
        raw.to_string()
    }
}

/// Build a table from a sheet range whose header sits on the 1-based physical
/// row `header_row`. Rows above the header are discarded.
fn range_to_table(range: &Range<Data>, header_row: u32) -> Option<Table> {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let (_, width) = range.get_size();
    let header_idx = header_row.checked_sub(1)?;
    if range.is_empty() || header_idx < start_row {
        return None;
    }
    let skip = (header_idx - start_row) as usize;
    let lead = start_col as usize;

    let mut rows = range.rows().skip(skip);
    let header = rows.next()?;
    let columns: Vec<String> = (0..lead)
        .map(|_| None)
        .chain(header.iter().map(cell_text))
        .enumerate()
        .map(|(i, cell)| header_name(cell.as_deref().unwrap_or(""), i))
        .collect();
    let columns = dedupe_headers(columns);
    debug_assert_eq!(columns.len(), lead + width);

    let mut table = Table::new(columns);
    for row in rows {
        let mut cells: Vec<Cell> = vec![None; lead];
        cells.extend(row.iter().map(cell_text));
        table.push_row(cells);
    }
    Some(table)
}

fn open_err(path: &Path, e: impl std::fmt::Display) -> IoError {
    IoError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Import the first sheet of a workbook with its header on the first row.
pub fn import_first_sheet(path: &Path) -> Result<Table, IoError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| open_err(path, e))?;
    let sheet_names = workbook.sheet_names();
    let Some(first) = sheet_names.first() else {
        return Err(open_err(path, "workbook contains no sheets"));
    };
    let range = workbook
        .worksheet_range(first)
        .map_err(|e| open_err(path, format!("cannot read sheet '{first}': {e}")))?;

    // An entirely empty sheet is a table with no columns; consolidation skips it.
    Ok(range_to_table(&range, range.start().map_or(1, |(r, _)| r + 1)).unwrap_or_default())
}

/// Import a named sheet whose header sits on the 1-based row `header_row`.
pub fn import_sheet(path: &Path, sheet: &str, header_row: u32) -> Result<Table, IoError> {
    let start_time = Instant::now();
    let mut workbook = open_workbook_auto(path).map_err(|e| open_err(path, e))?;
    let available = workbook.sheet_names();
    if !available.iter().any(|s| s == sheet) {
        return Err(IoError::SheetNotFound {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
            available,
        });
    }
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| open_err(path, format!("cannot read sheet '{sheet}': {e}")))?;

    let table = range_to_table(&range, header_row).ok_or_else(|| IoError::HeaderRowMissing {
        path: path.to_path_buf(),
        sheet: sheet.to_string(),
        row: header_row,
    })?;

    log::debug!(
        "read '{}' from {}: {} row(s) x {} column(s) in {}ms",
        sheet,
        path.display(),
        table.len(),
        table.columns.len(),
        start_time.elapsed().as_millis()
    );
    Ok(table)
}

// ============================================================================
// Export
// ============================================================================

/// Statistics for an xlsx export
#[derive(Debug, Default)]
pub struct ExportResult {
    pub sheets_exported: usize,
    pub rows_exported: usize,
    pub flags_highlighted: usize,
    pub export_duration_ms: u128,
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::RGB(HEADER_FONT))
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border(FormatBorder::Thin)
}

fn flag_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::RGB(FLAG_FONT))
        .set_background_color(Color::RGB(FLAG_FILL))
}

fn write_err(path: &Path, e: impl std::fmt::Display) -> IoError {
    IoError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Write one table: styled header, frozen first row, autofilter, autofit.
/// Cells in `highlight` columns holding a non-empty value get the flag format.
fn write_table(
    worksheet: &mut Worksheet,
    table: &Table,
    highlight: &[usize],
    path: &Path,
) -> Result<usize, IoError> {
    let header = header_format();
    let flag = flag_format();
    let mut flagged = 0;

    for (col, name) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, &header)
            .map_err(|e| write_err(path, e))?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let target_row = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let Some(value) = cell.as_deref() else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            if highlight.contains(&col) {
                worksheet
                    .write_string_with_format(target_row, col as u16, value, &flag)
                    .map_err(|e| write_err(path, e))?;
                flagged += 1;
            } else {
                worksheet
                    .write_string(target_row, col as u16, value)
                    .map_err(|e| write_err(path, e))?;
            }
        }
    }

    if !table.columns.is_empty() {
        worksheet.set_freeze_panes(1, 0).map_err(|e| write_err(path, e))?;
        worksheet
            .autofilter(0, 0, table.len() as u32, (table.columns.len() - 1) as u16)
            .map_err(|e| write_err(path, e))?;
    }
    worksheet.autofit();

    Ok(flagged)
}

/// Save to a sibling temp file, then move it into place, so a failed run
/// never leaves a partial workbook at `path`.
fn save_atomic(workbook: &mut XlsxWorkbook, path: &Path) -> Result<(), IoError> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    if let Err(e) = workbook.save(&partial) {
        let _ = std::fs::remove_file(&partial);
        return Err(write_err(path, e));
    }
    std::fs::rename(&partial, path).map_err(|e| {
        let _ = std::fs::remove_file(&partial);
        write_err(path, e)
    })
}

/// Export the reconciliation result, optionally followed by the merged BOM.
pub fn export_result(result: &Table, merged: Option<&Table>, path: &Path) -> Result<ExportResult, IoError> {
    let start_time = Instant::now();
    let mut stats = ExportResult::default();
    let mut workbook = XlsxWorkbook::new();

    let worksheet = workbook
        .add_worksheet()
        .set_name(RESULT_SHEET)
        .map_err(|e| write_err(path, e))?;
    stats.flags_highlighted = write_table(worksheet, result, &FLAG_COLUMNS, path)?;
    stats.rows_exported += result.len();
    stats.sheets_exported += 1;

    if let Some(merged) = merged {
        let worksheet = workbook
            .add_worksheet()
            .set_name(MERGED_SHEET)
            .map_err(|e| write_err(path, e))?;
        write_table(worksheet, merged, &[], path)?;
        stats.rows_exported += merged.len();
        stats.sheets_exported += 1;
    }

    save_atomic(&mut workbook, path)?;
    stats.export_duration_ms = start_time.elapsed().as_millis();
    Ok(stats)
}

/// Export a single table to its own workbook.
pub fn export_table(table: &Table, sheet: &str, path: &Path) -> Result<ExportResult, IoError> {
    let start_time = Instant::now();
    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(sheet)
        .map_err(|e| write_err(path, e))?;
    write_table(worksheet, table, &[], path)?;
    save_atomic(&mut workbook, path)?;

    Ok(ExportResult {
        sheets_exported: 1,
        rows_exported: table.len(),
        flags_highlighted: 0,
        export_duration_ms: start_time.elapsed().as_millis(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// Structure report: two title rows, header on row 3.
    fn write_structure_report(path: &Path) {
        let mut wb = XlsxWorkbook::new();
        let ws = wb.add_worksheet().set_name("Cover").unwrap();
        ws.write_string(0, 0, "cover").unwrap();
        let ws = wb.add_worksheet().set_name("Structure Report").unwrap();
        ws.write_string(0, 0, "BMW Structure Report").unwrap();
        ws.write_string(1, 0, "exported 2026-01-05").unwrap();
        ws.write_string(2, 0, "Material").unwrap();
        ws.write_string(2, 1, " 3rd Party Company No. ").unwrap();
        ws.write_string(2, 2, "part version (AI)").unwrap();
        ws.write_number(3, 0, 7_123_456.0).unwrap();
        ws.write_string(3, 1, "P1-01").unwrap();
        ws.write_string(3, 2, "A").unwrap();
        ws.write_number(4, 0, 12.5).unwrap();
        ws.write_boolean(4, 2, true).unwrap();
        wb.save(path).unwrap();
    }

    #[test]
    fn number_rendering() {
        assert_eq!(cell_text(&Data::Float(100.0)), Some("100".into()));
        assert_eq!(cell_text(&Data::Float(0.25)), Some("0.25".into()));
        assert_eq!(cell_text(&Data::Int(-3)), Some("-3".into()));
        assert_eq!(cell_text(&Data::String(String::new())), None);
        assert_eq!(cell_text(&Data::Empty), None);
    }

    #[test]
    fn authority_header_on_third_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bmw.xlsx");
        write_structure_report(&path);

        let table = import_sheet(&path, "Structure Report", 3).unwrap();
        assert_eq!(table.columns, cols(&["Material", " 3rd Party Company No. ", "part version (AI)"]));
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 0), Some("7123456"));
        assert_eq!(table.cell(0, 1), Some("P1-01"));
        assert_eq!(table.cell(1, 0), Some("12.5"));
        assert_eq!(table.cell(1, 1), None);
        assert_eq!(table.cell(1, 2), Some("TRUE"));
    }

    #[test]
    fn wrong_sheet_name_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bmw.xlsx");
        write_structure_report(&path);

        let err = import_sheet(&path, "Structure", 3).unwrap_err();
        match err {
            IoError::SheetNotFound { available, .. } => {
                assert_eq!(available, cols(&["Cover", "Structure Report"]))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_row_past_data_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bmw.xlsx");
        write_structure_report(&path);

        let err = import_sheet(&path, "Structure Report", 40).unwrap_err();
        assert!(matches!(err, IoError::HeaderRowMissing { row: 40, .. }));
    }

    #[test]
    fn first_sheet_keeps_leading_blank_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GA_BOM_01.xlsx");
        let mut wb = XlsxWorkbook::new();
        let ws = wb.add_worksheet();
        ws.write_string(0, 1, "DGLVL").unwrap();
        ws.write_string(0, 2, "OJTXP").unwrap();
        ws.write_string(1, 1, ".1").unwrap();
        ws.write_string(1, 2, "Engine").unwrap();
        ws.write_string(3, 1, "..2").unwrap();
        wb.save(&path).unwrap();

        let table = import_first_sheet(&path).unwrap();
        assert_eq!(table.columns, cols(&["Unnamed: 0", "DGLVL", "OJTXP"]));
        assert_eq!(table.len(), 3);
        assert_eq!(table.cell(0, 2), Some("Engine"));
        assert!(table.rows[1].iter().all(|c| c.is_none()));
        assert_eq!(table.cell(2, 1), Some("..2"));
    }

    #[test]
    fn repeated_headers_are_suffixed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GA_BOM_02.xlsx");
        let mut wb = XlsxWorkbook::new();
        let ws = wb.add_worksheet();
        for (col, name) in ["DGLVL", "OJTXP", "Qty", "Qty"].iter().enumerate() {
            ws.write_string(0, col as u16, *name).unwrap();
        }
        ws.write_string(1, 2, "1").unwrap();
        ws.write_string(1, 3, "2").unwrap();
        wb.save(&path).unwrap();

        let table = import_first_sheet(&path).unwrap();
        assert_eq!(table.columns, cols(&["DGLVL", "OJTXP", "Qty", "Qty.1"]));
        assert_eq!(table.cell(0, 2), Some("1"));
        assert_eq!(table.cell(0, 3), Some("2"));
    }

    #[test]
    fn export_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BMW_Validation_Result_20260101_000000.xlsx");

        let result = Table::with_rows(
            cols(&["TVS_Part", "x", "y", "z", "d", "BMW_Part", "k", "ai", "Validation_Status", "Comparison", "AI_Comparison"]),
            vec![vec![
                Some("P1".into()),
                None,
                Some("YES".into()),
                None,
                None,
                None,
                None,
                None,
                Some("Missing BMW".into()),
                Some(String::new()),
                Some(String::new()),
            ]],
        );
        let merged = Table::with_rows(cols(&["Source File", "GA Name"]), vec![vec![Some("GA".into()), None]]);

        let stats = export_result(&result, Some(&merged), &path).unwrap();
        assert_eq!(stats.sheets_exported, 2);
        assert_eq!(stats.rows_exported, 2);
        assert_eq!(stats.flags_highlighted, 1);
        assert!(!dir.path().join("BMW_Validation_Result_20260101_000000.xlsx.partial").exists());

        let back = import_sheet(&path, RESULT_SHEET, 1).unwrap();
        assert_eq!(back.columns, result.columns);
        assert_eq!(back.cell(0, 0), Some("P1"));
        assert_eq!(back.cell(0, 8), Some("Missing BMW"));

        let back = import_sheet(&path, MERGED_SHEET, 1).unwrap();
        assert_eq!(back.cell(0, 0), Some("GA"));
    }

    #[test]
    fn failed_export_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("out.xlsx");
        let table = Table::new(cols(&["a"]));
        assert!(export_table(&table, "Sheet1", &path).is_err());
        assert!(!path.exists());
    }
}
