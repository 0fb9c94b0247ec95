#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use replenish::domain::error::ReplenishError;
use replenish::domain::normalizer::RawRecord;
use replenish::domain::reorder::ReorderParams;
use replenish::domain::stock::StockLevels;
use replenish::ports::data_port::RecordPort;
use replenish::ports::stock_port::StockPort;
use std::io::Write;

pub struct MockRecordPort {
    pub records: Vec<RawRecord>,
    pub error: Option<String>,
}

impl MockRecordPort {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            records: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl RecordPort for MockRecordPort {
    fn fetch_records(&self) -> Result<Vec<RawRecord>, ReplenishError> {
        match &self.error {
            Some(reason) => Err(ReplenishError::Source {
                reason: reason.clone(),
            }),
            None => Ok(self.records.clone()),
        }
    }
}

pub struct MockStockPort {
    pub levels: Vec<(String, f64)>,
}

impl MockStockPort {
    pub fn new(levels: &[(&str, f64)]) -> Self {
        Self {
            levels: levels.iter().map(|(id, q)| (id.to_string(), *q)).collect(),
        }
    }
}

impl StockPort for MockStockPort {
    fn fetch_stock_levels(&self) -> Result<StockLevels, ReplenishError> {
        Ok(self.levels.iter().cloned().collect())
    }
}

pub fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n - 1)
}

/// A record on day `n` (day 1 = 2024-01-01), named after its product id.
pub fn record(product_id: &str, n: i64, quantity: f64) -> RawRecord {
    RawRecord::new(
        product_id,
        &format!("{product_id} name"),
        &day(n).format("%Y-%m-%d").to_string(),
        &quantity.to_string(),
    )
}

pub fn params(safety_coefficient: f64, window: i64, lead: i64, freq: i64) -> ReorderParams {
    ReorderParams::new(safety_coefficient, window, lead, freq).unwrap()
}

pub fn write_temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
