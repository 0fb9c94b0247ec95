//! Statistics reducer: one mean/stddev pair per demand series.
//!
//! Population statistics (divide by n) over every point of the series.

use crate::domain::demand::DemandSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct ProductStats {
    pub product_id: String,
    pub name: String,
    pub mean_demand: f64,
    pub demand_stddev: f64,
}

pub fn population_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn population_stddev(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    // Identical values must give exactly zero, not rounding noise.
    if values.iter().all(|&v| v == first) {
        return 0.0;
    }

    let mean = population_mean(values);
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;

    variance.sqrt()
}

pub fn reduce(demand: &DemandSeries) -> ProductStats {
    let values = demand.values();
    ProductStats {
        product_id: demand.product_id.clone(),
        name: demand.product_name.clone(),
        mean_demand: population_mean(&values),
        demand_stddev: population_stddev(&values),
    }
}
