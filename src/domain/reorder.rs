//! Reorder calculator.
//!
//! With H = lead_time_days + order_frequency_days:
//! MIN    = mean_demand * H
//! SAFETY = demand_stddev * safety_coefficient * sqrt(H)
//! THRESH = ceil(MIN + SAFETY)
//! DELTA  = THRESH - current_stock
//! ORDER  = ceil(MIN + DELTA) if DELTA >= 0, else 0

use crate::domain::error::ReplenishError;
use crate::domain::stats::ProductStats;
use serde::Serialize;

/// Run-wide replenishment parameters. Validated on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReorderParams {
    pub safety_coefficient: f64,
    pub window_size: usize,
    pub lead_time_days: u32,
    pub order_frequency_days: u32,
}

impl ReorderParams {
    pub fn new(
        safety_coefficient: f64,
        window_size: i64,
        lead_time_days: i64,
        order_frequency_days: i64,
    ) -> Result<Self, ReplenishError> {
        if !safety_coefficient.is_finite() || safety_coefficient < 0.0 {
            return Err(invalid(
                "safety_coefficient",
                "safety_coefficient must be a non-negative number",
            ));
        }
        if window_size < 1 {
            return Err(invalid("window_size", "window_size must be at least 1"));
        }
        let lead_time_days = u32::try_from(lead_time_days)
            .map_err(|_| invalid("lead_time_days", "lead_time_days must be non-negative"))?;
        let order_frequency_days = u32::try_from(order_frequency_days).map_err(|_| {
            invalid(
                "order_frequency_days",
                "order_frequency_days must be non-negative",
            )
        })?;

        Ok(Self {
            safety_coefficient,
            window_size: window_size as usize,
            lead_time_days,
            order_frequency_days,
        })
    }

    /// Days covered by one replenishment cycle: lead time plus review period.
    pub fn horizon_days(&self) -> f64 {
        f64::from(self.lead_time_days) + f64::from(self.order_frequency_days)
    }
}

fn invalid(key: &str, reason: &str) -> ReplenishError {
    ReplenishError::ConfigInvalid {
        section: "parameters".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Final per-product result. Field order is the output column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReorderRow {
    pub product_id: String,
    pub name: String,
    pub lead_time_days: u32,
    pub safety_coefficient: f64,
    pub order_frequency_days: u32,
    pub mean_demand: f64,
    pub demand_stddev: f64,
    pub min_stock: f64,
    pub safety_stock: f64,
    pub reorder_threshold: f64,
    pub current_stock: f64,
    pub stock_delta: f64,
    pub order_quantity: f64,
}

pub fn calculate_reorder(
    stats: &ProductStats,
    params: &ReorderParams,
    current_stock: f64,
) -> ReorderRow {
    let horizon = params.horizon_days();

    let min_stock = stats.mean_demand * horizon;
    let safety_stock = stats.demand_stddev * params.safety_coefficient * horizon.sqrt();
    let reorder_threshold = (min_stock + safety_stock).ceil();
    let stock_delta = reorder_threshold - current_stock;
    let order_quantity = if stock_delta >= 0.0 {
        (min_stock + stock_delta).ceil()
    } else {
        0.0
    };

    ReorderRow {
        product_id: stats.product_id.clone(),
        name: stats.name.clone(),
        lead_time_days: params.lead_time_days,
        safety_coefficient: params.safety_coefficient,
        order_frequency_days: params.order_frequency_days,
        mean_demand: stats.mean_demand,
        demand_stddev: stats.demand_stddev,
        min_stock,
        safety_stock,
        reorder_threshold,
        current_stock,
        stock_delta,
        order_quantity,
    }
}
