//! Service layer
//!
//! - [`InventoryService`] - aggregate counters, warehouse units and the
//!   reconciliation pass that keeps the two in step.
//! - [`CatalogService`] - product flows that touch inventory (creation with
//!   initial stock, EAN propagation, removal).

pub mod catalog_service;
pub mod inventory_service;

pub use catalog_service::CatalogService;
pub use inventory_service::{InventoryService, ReconcileOutcome};
