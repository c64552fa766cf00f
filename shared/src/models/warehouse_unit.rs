//! Warehouse Unit Model (individually tracked physical item)

use serde::{Deserialize, Serialize};

use super::{BucketKey, Condition, Location};

/// One physical, individually trackable item.
///
/// Units are created anonymous (`ean_code`/`serial_number` empty) by the
/// reconciliation pass and gain identity later, when the piece is scanned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WarehouseUnit {
    pub id: i64,
    pub product_id: i64,
    pub warehouse_id: i64,
    pub condition: Condition,
    pub location: Location,
    pub ean_code: String,
    pub serial_number: String,
    pub price: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl WarehouseUnit {
    pub fn bucket(&self) -> BucketKey {
        BucketKey::new(
            self.product_id,
            self.warehouse_id,
            self.condition,
            self.location,
        )
    }

    /// Whether the physical piece has been identified yet.
    pub fn has_identity(&self) -> bool {
        !self.ean_code.is_empty() || !self.serial_number.is_empty()
    }
}

/// Create warehouse unit payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseUnitCreate {
    pub product_id: i64,
    pub warehouse_id: i64,
    pub condition: Condition,
    pub location: Location,
    #[serde(default)]
    pub ean_code: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub price: f64,
}

impl WarehouseUnitCreate {
    /// An anonymous unit for a bucket, as produced by reconciliation.
    pub fn blank(bucket: BucketKey, price: f64) -> Self {
        Self {
            product_id: bucket.product_id,
            warehouse_id: bucket.warehouse_id,
            condition: bucket.condition,
            location: bucket.location,
            ean_code: String::new(),
            serial_number: String::new(),
            price,
        }
    }
}

/// Identity fields attached to a unit post-hoc (barcode/serial scan).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitIdentity {
    pub ean_code: Option<String>,
    pub serial_number: Option<String>,
}
