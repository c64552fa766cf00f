//! Warehouse Model (aggregate counter record)

use serde::{Deserialize, Serialize};

use super::{Condition, Location};

/// Per-condition quantity pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevels {
    #[serde(default)]
    pub new: i64,
    #[serde(default)]
    pub used: i64,
}

impl StockLevels {
    pub fn get(&self, condition: Condition) -> i64 {
        match condition {
            Condition::New => self.new,
            Condition::Used => self.used,
        }
    }
}

/// Per-condition price pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceLevels {
    #[serde(default)]
    pub new: f64,
    #[serde(default)]
    pub used: f64,
}

impl PriceLevels {
    pub fn get(&self, condition: Condition) -> f64 {
        match condition {
            Condition::New => self.new,
            Condition::Used => self.used,
        }
    }
}

/// Warehouse entity, one per product.
///
/// The four quantity columns hold the *intended* count per bucket; the
/// reconciliation pass materializes them as live warehouse units. The two
/// may diverge between a counter update and the pass that follows it, never
/// after an error-free pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Warehouse {
    pub id: i64,
    pub product_id: i64,
    pub quantity_in_stock_new: i64,
    pub quantity_in_stock_used: i64,
    pub quantity_in_store_new: i64,
    pub quantity_in_store_used: i64,
    pub price_new: f64,
    pub price_used: f64,
    /// JSON array of document URLs
    pub documents: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Warehouse {
    /// Counter value for one bucket.
    pub fn quantity(&self, location: Location, condition: Condition) -> i64 {
        match (location, condition) {
            (Location::InStock, Condition::New) => self.quantity_in_stock_new,
            (Location::InStock, Condition::Used) => self.quantity_in_stock_used,
            (Location::InStore, Condition::New) => self.quantity_in_store_new,
            (Location::InStore, Condition::Used) => self.quantity_in_store_used,
        }
    }

    pub fn quantity_in_stock(&self) -> StockLevels {
        StockLevels {
            new: self.quantity_in_stock_new,
            used: self.quantity_in_stock_used,
        }
    }

    pub fn quantity_in_store(&self) -> StockLevels {
        StockLevels {
            new: self.quantity_in_store_new,
            used: self.quantity_in_store_used,
        }
    }

    pub fn price(&self, condition: Condition) -> f64 {
        match condition {
            Condition::New => self.price_new,
            Condition::Used => self.price_used,
        }
    }
}

/// Create warehouse payload. Absent levels default to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarehouseCreate {
    #[serde(default)]
    pub quantity_in_stock: StockLevels,
    #[serde(default)]
    pub quantity_in_store: StockLevels,
    #[serde(default)]
    pub price: PriceLevels,
    pub documents: Option<Vec<String>>,
}
