//! Spreadsheet (xlsx/xlsm/xlsb/xls/ods) adapters backed by calamine.

use crate::adapters::table::{project_records, project_stock};
use crate::domain::error::ReplenishError;
use crate::domain::layout::{SourceLayout, StockLayout};
use crate::domain::normalizer::RawRecord;
use crate::domain::stock::StockLevels;
use crate::ports::data_port::RecordPort;
use crate::ports::stock_port::StockPort;
use calamine::{open_workbook_auto, Data, DataType, Reader};
use std::path::{Path, PathBuf};

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// Date cells become `YYYY-MM-DD`; everything else uses its display text.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

/// Read one sheet (0-based index) as rows of cell text.
pub fn read_sheet_rows(path: &Path, sheet_index: usize) -> Result<Vec<Vec<String>>, ReplenishError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ReplenishError::Source {
        reason: format!("failed to open {}: {}", path.display(), e),
    })?;

    let range = workbook
        .worksheet_range_at(sheet_index)
        .ok_or_else(|| ReplenishError::Source {
            reason: format!("{}: no sheet at index {}", path.display(), sheet_index),
        })?
        .map_err(|e| ReplenishError::Source {
            reason: format!("failed to read sheet {} of {}: {}", sheet_index, path.display(), e),
        })?;

    // calamine ranges start at the first used cell; pad the leading empty
    // rows back in so skip_rows counts from the top of the sheet.
    let (first_row, _) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); first_row as usize];
    rows.extend(range.rows().map(|row| row.iter().map(cell_text).collect::<Vec<_>>()));
    Ok(rows)
}

pub struct SpreadsheetAdapter {
    path: PathBuf,
    layout: SourceLayout,
}

impl SpreadsheetAdapter {
    pub fn new(path: PathBuf, layout: SourceLayout) -> Self {
        Self { path, layout }
    }
}

impl RecordPort for SpreadsheetAdapter {
    fn fetch_records(&self) -> Result<Vec<RawRecord>, ReplenishError> {
        let rows = read_sheet_rows(&self.path, self.layout.sheet_index)?;
        project_records(rows, &self.layout, &self.path.display().to_string())
    }
}

pub struct SpreadsheetStockAdapter {
    path: PathBuf,
    layout: StockLayout,
}

impl SpreadsheetStockAdapter {
    pub fn new(path: PathBuf, layout: StockLayout) -> Self {
        Self { path, layout }
    }
}

impl StockPort for SpreadsheetStockAdapter {
    fn fetch_stock_levels(&self) -> Result<StockLevels, ReplenishError> {
        let rows = read_sheet_rows(&self.path, self.layout.sheet_index)?;
        project_stock(rows, &self.layout, &self.path.display().to_string())
    }
}
