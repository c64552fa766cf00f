//! Sklad inventory engine
//!
//! Keeps a product's aggregate stock counters (quantity in stock / in store,
//! per condition) synchronized with its individually tracked warehouse unit
//! records. The surrounding catalog and order subsystems call into
//! [`services::InventoryService`] and [`services::CatalogService`] directly;
//! HTTP transport, auth and file handling live outside this crate.

pub mod core;
pub mod db;
pub mod services;
pub mod utils;

pub use crate::core::Config;
pub use crate::db::DbService;
pub use crate::db::repository::{RepoError, RepoResult};
pub use crate::services::{CatalogService, InventoryService, ReconcileOutcome};
