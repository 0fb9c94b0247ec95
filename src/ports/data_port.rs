//! Consumption history source port.

use crate::domain::error::ReplenishError;
use crate::domain::normalizer::RawRecord;

/// Yields every data row of a source table, projected onto the canonical
/// columns but not yet cleaned. Header and trailing rows are already removed.
pub trait RecordPort {
    fn fetch_records(&self) -> Result<Vec<RawRecord>, ReplenishError>;
}
