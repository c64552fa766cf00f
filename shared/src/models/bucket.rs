//! Bucket addressing
//!
//! Stock is tracked at (product, warehouse, condition, location) granularity.
//! [`BucketKey`] is the single addressing type used by reconciliation, unit
//! queries, counter columns and the per-bucket lock registry; loose
//! string/tuple plumbing is deliberately not part of the API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Item condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
}

impl Condition {
    pub const ALL: [Condition; 2] = [Condition::New, Condition::Used];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Used => "used",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Condition::New),
            "used" => Ok(Condition::Used),
            other => Err(format!("invalid condition: {other}")),
        }
    }
}

/// Physical placement of a unit: warehouse shelf or showroom floor.
///
/// Stored as the legacy strings `"in stock"` / `"in store"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum Location {
    #[cfg_attr(feature = "db", sqlx(rename = "in stock"))]
    #[serde(rename = "in stock")]
    InStock,
    #[cfg_attr(feature = "db", sqlx(rename = "in store"))]
    #[serde(rename = "in store")]
    InStore,
}

impl Location {
    pub const ALL: [Location; 2] = [Location::InStock, Location::InStore];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::InStock => "in stock",
            Location::InStore => "in store",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in stock" | "stock" => Ok(Location::InStock),
            "in store" | "store" => Ok(Location::InStore),
            other => Err(format!("invalid location: {other}")),
        }
    }
}

/// The unit of reconciliation granularity.
///
/// Each product has four buckets: (new, in stock), (used, in stock),
/// (new, in store), (used, in store).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketKey {
    pub product_id: i64,
    pub warehouse_id: i64,
    pub condition: Condition,
    pub location: Location,
}

impl BucketKey {
    pub fn new(
        product_id: i64,
        warehouse_id: i64,
        condition: Condition,
        location: Location,
    ) -> Self {
        Self {
            product_id,
            warehouse_id,
            condition,
            location,
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "product {} / warehouse {} [{}/{}]",
            self.product_id, self.warehouse_id, self.condition, self.location
        )
    }
}
