//! Source table layouts and record-cleaning policy.
//!
//! Column names differ between export formats, so the mapping from a table's
//! header row onto the canonical record fields is configuration, not code.

pub const DEFAULT_DATE_SENTINELS: &[&str] = &["unknown"];
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Where the consumption columns live in a source table.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLayout {
    pub product_id_column: String,
    pub product_name_column: String,
    pub date_column: String,
    pub quantity_column: String,
    /// Rows above the header row.
    pub skip_rows: usize,
    /// Rows after the data region, e.g. a totals line.
    pub skip_trailing_rows: usize,
    pub sheet_index: usize,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            product_id_column: "product code".to_string(),
            product_name_column: "product name".to_string(),
            date_column: "date".to_string(),
            quantity_column: "quantity".to_string(),
            skip_rows: 0,
            skip_trailing_rows: 0,
            sheet_index: 0,
        }
    }
}

/// Where the on-hand quantities live in a stock table.
#[derive(Debug, Clone, PartialEq)]
pub struct StockLayout {
    pub product_id_column: String,
    pub quantity_column: String,
    pub skip_rows: usize,
    pub sheet_index: usize,
}

impl Default for StockLayout {
    fn default() -> Self {
        Self {
            product_id_column: "product code".to_string(),
            quantity_column: "valuated quantity".to_string(),
            skip_rows: 0,
            sheet_index: 0,
        }
    }
}

/// How raw date cells are interpreted by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizePolicy {
    /// Values that mean "no date" (compared case-insensitively).
    pub date_sentinels: Vec<String>,
    /// chrono formats tried in order.
    pub date_formats: Vec<String>,
}

impl Default for NormalizePolicy {
    fn default() -> Self {
        Self {
            date_sentinels: DEFAULT_DATE_SENTINELS.iter().map(|s| s.to_string()).collect(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Split a comma separated config value, dropping empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Canonical form used when matching header cells against configured names.
pub fn normalize_header(cell: &str) -> String {
    cell.trim().to_lowercase()
}

/// Locate a configured column in a header row.
pub fn find_column(header: &[String], name: &str) -> Option<usize> {
    let wanted = normalize_header(name);
    header.iter().position(|c| normalize_header(c) == wanted)
}
