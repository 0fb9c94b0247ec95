//! Stock-on-hand feed port.

use crate::domain::error::ReplenishError;
use crate::domain::stock::StockLevels;

pub trait StockPort {
    fn fetch_stock_levels(&self) -> Result<StockLevels, ReplenishError>;
}
