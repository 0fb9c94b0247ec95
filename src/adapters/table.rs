//! Header discovery and column projection shared by the table adapters.
//!
//! Adapters read a whole sheet as rows of cell text; these helpers skip the
//! preamble, find the configured columns in the header row and project the
//! data rows onto the canonical record fields.

use crate::domain::error::ReplenishError;
use crate::domain::layout::{find_column, SourceLayout, StockLayout};
use crate::domain::normalizer::{parse_quantity, RawRecord};
use crate::domain::stock::StockLevels;

fn split_header(
    mut rows: Vec<Vec<String>>,
    skip_rows: usize,
    source: &str,
) -> Result<(Vec<String>, Vec<Vec<String>>), ReplenishError> {
    if rows.len() <= skip_rows {
        return Err(ReplenishError::Source {
            reason: format!(
                "{}: no header row after skipping {} rows",
                source, skip_rows
            ),
        });
    }
    let mut data = rows.split_off(skip_rows);
    let header = data.remove(0);
    Ok((header, data))
}

fn require_column(header: &[String], name: &str, source: &str) -> Result<usize, ReplenishError> {
    find_column(header, name).ok_or_else(|| ReplenishError::Source {
        reason: format!("{}: column {:?} not found in header", source, name),
    })
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Project a consumption table. `source` names the table in error messages.
pub fn project_records(
    rows: Vec<Vec<String>>,
    layout: &SourceLayout,
    source: &str,
) -> Result<Vec<RawRecord>, ReplenishError> {
    let (header, mut data) = split_header(rows, layout.skip_rows, source)?;

    let id_col = require_column(&header, &layout.product_id_column, source)?;
    let date_col = require_column(&header, &layout.date_column, source)?;
    let qty_col = require_column(&header, &layout.quantity_column, source)?;
    let name_col = find_column(&header, &layout.product_name_column);
    if name_col.is_none() {
        eprintln!(
            "warning: {}: no {:?} column, using product codes as names",
            source, layout.product_name_column
        );
    }

    let keep = data.len().saturating_sub(layout.skip_trailing_rows);
    data.truncate(keep);

    Ok(data
        .iter()
        .filter(|row| !is_blank(row))
        .map(|row| {
            let product_id = cell(row, id_col);
            RawRecord {
                product_id: product_id.to_string(),
                product_name: name_col
                    .map(|i| cell(row, i))
                    .unwrap_or(product_id)
                    .to_string(),
                date: cell(row, date_col).to_string(),
                quantity: cell(row, qty_col).to_string(),
            }
        })
        .collect())
}

/// Project a stock table. Rows without a product code or with an
/// unusable quantity are skipped.
pub fn project_stock(
    rows: Vec<Vec<String>>,
    layout: &StockLayout,
    source: &str,
) -> Result<StockLevels, ReplenishError> {
    let (header, data) = split_header(rows, layout.skip_rows, source)?;

    let id_col = require_column(&header, &layout.product_id_column, source)?;
    let qty_col = require_column(&header, &layout.quantity_column, source)?;

    let mut levels = StockLevels::new();
    for row in &data {
        let product_id = cell(row, id_col).trim();
        if product_id.is_empty() {
            continue;
        }
        if let Ok(quantity) = parse_quantity(cell(row, qty_col)) {
            levels.add(product_id, quantity);
        }
    }
    Ok(levels)
}
