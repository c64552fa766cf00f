//! Data models
//!
//! Shared between the inventory engine and its callers (catalog, orders).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod bucket;
pub mod order;
pub mod product;
pub mod warehouse;
pub mod warehouse_unit;

// Re-exports
pub use bucket::*;
pub use order::*;
pub use product::*;
pub use warehouse::*;
pub use warehouse_unit::*;
