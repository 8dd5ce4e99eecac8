use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 在庫レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    Low,
    Normal,
    Overstocked,
}

impl StockLevel {
    /// Classifies a quantity against its min/max thresholds.
    /// The overstock bound only applies when `max` is above `min`.
    pub fn classify(current: f64, min: f64, max: f64) -> Self {
        if current <= 0.0 {
            StockLevel::OutOfStock
        } else if current <= min {
            StockLevel::Low
        } else if max > min && current > max {
            StockLevel::Overstocked
        } else {
            StockLevel::Normal
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumableModel {
    pub id: String,
    pub name: String,
    pub current_quantity: f64,
    #[serde(default)]
    pub min_quantity: f64,
    #[serde(default)]
    pub max_quantity: f64,
    #[serde(default)]
    pub unit: String,
}

impl ConsumableModel {
    pub fn stock_level(&self) -> StockLevel {
        StockLevel::classify(self.current_quantity, self.min_quantity, self.max_quantity)
    }
}
