//! End-to-end replenishment run over an in-memory dataset.
//!
//! normalize -> aggregate -> rolling demand -> reduce -> reorder.
//! Either every eligible product gets a row or the run fails; nothing partial.

use crate::domain::aggregator::{aggregate, global_date_range, DateRange, SkippedProduct};
use crate::domain::demand::calculate_rolling_demand;
use crate::domain::error::ReplenishError;
use crate::domain::layout::NormalizePolicy;
use crate::domain::normalizer::{normalize, DropCounts, RawRecord};
use crate::domain::reorder::{calculate_reorder, ReorderParams, ReorderRow};
use crate::domain::stats::reduce;
use crate::domain::stock::StockLevels;

#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// One row per eligible product, in first-appearance order.
    pub rows: Vec<ReorderRow>,
    pub skipped: Vec<SkippedProduct>,
    pub drops: DropCounts,
    pub range: DateRange,
}

pub fn run_pipeline(
    records: &[RawRecord],
    policy: &NormalizePolicy,
    params: &ReorderParams,
    stock: &StockLevels,
) -> Result<PipelineResult, ReplenishError> {
    let normalized = normalize(records, policy);

    let range =
        global_date_range(&normalized.observations).ok_or(ReplenishError::NoObservations)?;
    if range.span_days() < params.window_size as i64 {
        return Err(ReplenishError::InsufficientHistory {
            span_days: range.span_days(),
            window_size: params.window_size,
        });
    }

    let aggregation = aggregate(&normalized.observations, range.end, params.window_size);

    let rows = aggregation
        .series
        .iter()
        .map(|series| {
            let demand = calculate_rolling_demand(series, params.window_size);
            let stats = reduce(&demand);
            calculate_reorder(&stats, params, stock.get(&stats.product_id))
        })
        .collect();

    Ok(PipelineResult {
        rows,
        skipped: aggregation.skipped,
        drops: normalized.drops,
        range,
    })
}
