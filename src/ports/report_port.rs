//! Report generation port.

use crate::domain::assembler::AssembledRow;
use crate::domain::error::ReplenishError;
use std::path::Path;

/// Port for writing replenishment reports.
pub trait ReportPort {
    /// Write all rows in one go. On error nothing usable is left at `output_path`.
    fn write(&self, rows: &[AssembledRow], output_path: &Path) -> Result<(), ReplenishError>;
}
