//! Plain (non-report) output: reorder rows as CSV or JSON.
//!
//! Writers render into memory first; callers flush the finished buffer in
//! one write so a failure never leaves half a table behind.

use crate::domain::assembler::{AssembledRow, ReportField};
use crate::domain::error::ReplenishError;
use crate::domain::reorder::ReorderRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

fn reorder_rows(rows: &[AssembledRow]) -> Vec<&ReorderRow> {
    rows.iter().map(AssembledRow::reorder_row).collect()
}

pub fn render_csv(rows: &[AssembledRow]) -> Result<Vec<u8>, ReplenishError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    // Explicit header so an empty result still names its columns.
    wtr.write_record(ReportField::ALL.iter().map(|f| f.key()))
        .map_err(|e| ReplenishError::Report {
            reason: format!("CSV write error: {}", e),
        })?;
    for row in reorder_rows(rows) {
        wtr.serialize(row).map_err(|e| ReplenishError::Report {
            reason: format!("CSV write error: {}", e),
        })?;
    }
    wtr.into_inner().map_err(|e| ReplenishError::Report {
        reason: format!("CSV flush error: {}", e),
    })
}

pub fn render_json(rows: &[AssembledRow]) -> Result<Vec<u8>, ReplenishError> {
    let mut out = serde_json::to_vec_pretty(&reorder_rows(rows)).map_err(|e| {
        ReplenishError::Report {
            reason: format!("JSON write error: {}", e),
        }
    })?;
    out.push(b'\n');
    Ok(out)
}

pub fn render(rows: &[AssembledRow], format: OutputFormat) -> Result<Vec<u8>, ReplenishError> {
    match format {
        OutputFormat::Csv => render_csv(rows),
        OutputFormat::Json => render_json(rows),
    }
}
