//! CSV file adapters for consumption history and stock levels.

use crate::adapters::table::{project_records, project_stock};
use crate::domain::error::ReplenishError;
use crate::domain::layout::{SourceLayout, StockLayout};
use crate::domain::normalizer::RawRecord;
use crate::domain::stock::StockLevels;
use crate::ports::data_port::RecordPort;
use crate::ports::stock_port::StockPort;
use std::fs;
use std::path::{Path, PathBuf};

/// Read every row of a CSV file as cell text. No row is treated as a header
/// here; header discovery happens after preamble rows are skipped.
pub fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>, ReplenishError> {
    let content = fs::read_to_string(path).map_err(|e| ReplenishError::Source {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| ReplenishError::Source {
            reason: format!("CSV parse error in {}: {}", path.display(), e),
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

pub struct CsvAdapter {
    path: PathBuf,
    layout: SourceLayout,
}

impl CsvAdapter {
    pub fn new(path: PathBuf, layout: SourceLayout) -> Self {
        Self { path, layout }
    }
}

impl RecordPort for CsvAdapter {
    fn fetch_records(&self) -> Result<Vec<RawRecord>, ReplenishError> {
        let rows = read_csv_rows(&self.path)?;
        project_records(rows, &self.layout, &self.path.display().to_string())
    }
}

pub struct CsvStockAdapter {
    path: PathBuf,
    layout: StockLayout,
}

impl CsvStockAdapter {
    pub fn new(path: PathBuf, layout: StockLayout) -> Self {
        Self { path, layout }
    }
}

impl StockPort for CsvStockAdapter {
    fn fetch_stock_levels(&self) -> Result<StockLevels, ReplenishError> {
        let rows = read_csv_rows(&self.path)?;
        project_stock(rows, &self.layout, &self.path.display().to_string())
    }
}
