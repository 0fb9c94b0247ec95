//! Units on hand per product, as supplied by a stock feed.

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockLevels {
    levels: HashMap<String, f64>,
}

impl StockLevels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add units for a product; repeated ids accumulate (several locations).
    pub fn add(&mut self, product_id: &str, quantity: f64) {
        *self
            .levels
            .entry(product_id.trim().to_string())
            .or_insert(0.0) += quantity;
    }

    /// Units on hand, 0 for products the feed does not know.
    pub fn get(&self, product_id: &str) -> f64 {
        self.levels.get(product_id).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl FromIterator<(String, f64)> for StockLevels {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut levels = StockLevels::new();
        for (id, quantity) in iter {
            levels.add(&id, quantity);
        }
        levels
    }
}
