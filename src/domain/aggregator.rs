//! Per-product aggregation onto a shared daily timeline.
//!
//! Every product is projected onto the calendar from its first observation
//! up to the dataset-wide last date, so products that stopped moving still
//! accrue zero-demand days. The end anchor is computed once by the caller
//! and passed in.

use crate::domain::normalizer::Observation;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// First and last observed dates across all products.
pub fn global_date_range(observations: &[Observation]) -> Option<DateRange> {
    let start = observations.iter().map(|o| o.date).min()?;
    let end = observations.iter().map(|o| o.date).max()?;
    Some(DateRange { start, end })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub quantity: f64,
}

/// Gap-free daily consumption for one product.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    pub product_id: String,
    pub product_name: String,
    pub points: Vec<DailyPoint>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// Observations of one product with same-day withdrawals summed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductGroup {
    pub product_id: String,
    pub product_name: String,
    pub daily_totals: BTreeMap<NaiveDate, f64>,
    pub observation_count: usize,
}

impl ProductGroup {
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.daily_totals.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.daily_totals.keys().next_back().copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedProduct {
    pub product_id: String,
    pub product_name: String,
    pub span_days: i64,
}

#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub series: Vec<DailySeries>,
    pub skipped: Vec<SkippedProduct>,
}

/// Group observations by product in order of first appearance.
///
/// The product name is taken from the product's first observation.
pub fn group_by_product(observations: &[Observation]) -> Vec<ProductGroup> {
    let mut groups: Vec<ProductGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for obs in observations {
        let slot = *index.entry(obs.product_id.as_str()).or_insert_with(|| {
            groups.push(ProductGroup {
                product_id: obs.product_id.clone(),
                product_name: obs.product_name.clone(),
                daily_totals: BTreeMap::new(),
                observation_count: 0,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        *group.daily_totals.entry(obs.date).or_insert(0.0) += obs.quantity;
        group.observation_count += 1;
    }

    groups
}

/// Fill every day in `[group start, global_end]`, zero where nothing was withdrawn.
/// Totals dated after `global_end` are ignored.
pub fn build_daily_series(group: &ProductGroup, global_end: NaiveDate) -> DailySeries {
    let points = match group.start_date() {
        Some(start) if start <= global_end => {
            let days = (global_end - start).num_days() as usize + 1;
            start
                .iter_days()
                .take(days)
                .map(|date| DailyPoint {
                    date,
                    quantity: group.daily_totals.get(&date).copied().unwrap_or(0.0),
                })
                .collect()
        }
        _ => Vec::new(),
    };

    DailySeries {
        product_id: group.product_id.clone(),
        product_name: group.product_name.clone(),
        points,
    }
}

/// Build the daily series of every product observed over at least
/// `window_size` days (first to last observation). Shorter histories are
/// reported in `skipped` and get no series. Eligible series still run to
/// `global_end`.
pub fn aggregate(
    observations: &[Observation],
    global_end: NaiveDate,
    window_size: usize,
) -> Aggregation {
    let mut aggregation = Aggregation::default();

    for group in group_by_product(observations) {
        let (Some(start), Some(last)) = (group.start_date(), group.last_date()) else {
            continue;
        };
        let span_days = (last - start).num_days();

        if span_days < window_size as i64 {
            aggregation.skipped.push(SkippedProduct {
                product_id: group.product_id,
                product_name: group.product_name,
                span_days,
            });
            continue;
        }

        aggregation.series.push(build_daily_series(&group, global_end));
    }

    aggregation
}
