//! Record normalizer.
//!
//! Turns projected table rows into canonical observations. Rows that cannot
//! be cleaned are dropped and counted; a bad row never fails the run.

use crate::domain::error::RecordError;
use crate::domain::layout::NormalizePolicy;
use chrono::{NaiveDate, NaiveDateTime};

/// Date-time layouts accepted in addition to the configured date formats.
/// The time of day is discarded.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// A source row already projected onto the canonical columns, as text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub product_id: String,
    pub product_name: String,
    pub date: String,
    pub quantity: String,
}

impl RawRecord {
    pub fn new(product_id: &str, product_name: &str, date: &str, quantity: &str) -> Self {
        Self {
            product_id: product_id.to_string(),
            product_name: product_name.to_string(),
            date: date.to_string(),
            quantity: quantity.to_string(),
        }
    }
}

/// One withdrawal of `quantity` units of a product on a calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub product_id: String,
    pub product_name: String,
    pub date: NaiveDate,
    pub quantity: f64,
}

/// Per-category tally of rows the normalizer dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropCounts {
    pub missing_product: usize,
    pub missing_date: usize,
    pub malformed_date: usize,
    pub malformed_quantity: usize,
}

impl DropCounts {
    pub fn record(&mut self, err: &RecordError) {
        match err {
            RecordError::MissingProduct => self.missing_product += 1,
            RecordError::MissingDate => self.missing_date += 1,
            RecordError::MalformedDate { .. } => self.malformed_date += 1,
            RecordError::MalformedQuantity { .. } => self.malformed_quantity += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.missing_product + self.missing_date + self.malformed_date + self.malformed_quantity
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedRecords {
    /// Sorted by `(product_id, date)`, input order kept for ties.
    pub observations: Vec<Observation>,
    pub drops: DropCounts,
}

impl NormalizePolicy {
    pub fn is_sentinel(&self, value: &str) -> bool {
        let value = value.trim();
        value.is_empty()
            || self
                .date_sentinels
                .iter()
                .any(|s| s.trim().eq_ignore_ascii_case(value))
    }

    pub fn parse_date(&self, value: &str) -> Result<NaiveDate, RecordError> {
        let value = value.trim();
        if self.is_sentinel(value) {
            return Err(RecordError::MissingDate);
        }

        for format in &self.date_formats {
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                return Ok(date);
            }
        }
        for format in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
                return Ok(dt.date());
            }
        }

        Err(RecordError::MalformedDate {
            value: value.to_string(),
        })
    }
}

/// Parse a withdrawn quantity. A decimal comma is accepted.
pub fn parse_quantity(value: &str) -> Result<f64, RecordError> {
    let malformed = || RecordError::MalformedQuantity {
        value: value.to_string(),
    };
    let quantity: f64 = value
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| malformed())?;

    if !quantity.is_finite() || quantity < 0.0 {
        return Err(malformed());
    }
    Ok(quantity)
}

pub fn normalize_record(
    record: &RawRecord,
    policy: &NormalizePolicy,
) -> Result<Observation, RecordError> {
    let product_id = record.product_id.trim();
    if product_id.is_empty() {
        return Err(RecordError::MissingProduct);
    }

    let date = policy.parse_date(&record.date)?;
    let quantity = parse_quantity(&record.quantity)?;

    Ok(Observation {
        product_id: product_id.to_string(),
        product_name: record.product_name.trim().to_string(),
        date,
        quantity,
    })
}

pub fn normalize(records: &[RawRecord], policy: &NormalizePolicy) -> NormalizedRecords {
    let mut observations = Vec::with_capacity(records.len());
    let mut drops = DropCounts::default();

    for record in records {
        match normalize_record(record, policy) {
            Ok(obs) => observations.push(obs),
            Err(e) => drops.record(&e),
        }
    }

    // sort_by is stable: same-key rows keep input order.
    observations.sort_by(|a, b| {
        a.product_id
            .cmp(&b.product_id)
            .then_with(|| a.date.cmp(&b.date))
    });

    NormalizedRecords {
        observations,
        drops,
    }
}
