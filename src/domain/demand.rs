//! Rolling demand estimator.
//!
//! Causal simple moving average over the daily series:
//! AVG(w)[i] = sum(Q[j] for j in max(0, i-w+1)..=i) / (number of days in that range)
//! The window is partial at the start of the series, so AVG[0] = Q[0].

use crate::domain::aggregator::DailySeries;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandPoint {
    pub date: NaiveDate,
    pub rolling_average: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemandSeries {
    pub product_id: String,
    pub product_name: String,
    pub window_size: usize,
    pub points: Vec<DemandPoint>,
}

impl DemandSeries {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.rolling_average).collect()
    }
}

pub fn calculate_rolling_demand(series: &DailySeries, window_size: usize) -> DemandSeries {
    let window_size = window_size.max(1);
    let mut points = Vec::with_capacity(series.points.len());

    for i in 0..series.points.len() {
        let start = (i + 1).saturating_sub(window_size);
        let window = &series.points[start..=i];
        let sum: f64 = window.iter().map(|p| p.quantity).sum();

        points.push(DemandPoint {
            date: series.points[i].date,
            rolling_average: sum / window.len() as f64,
        });
    }

    DemandSeries {
        product_id: series.product_id.clone(),
        product_name: series.product_name.clone(),
        window_size,
        points,
    }
}
