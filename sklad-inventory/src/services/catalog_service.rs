//! Catalog Service - product flows that touch inventory
//!
//! Product CRUD itself belongs to the surrounding catalog subsystem; this
//! service covers only the slices that must stay in step with warehouse
//! state: creation with initial stock, EAN changes (which propagate to unit
//! records), removal, and counter-record documents.

use sqlx::SqlitePool;

use crate::db::repository::{RepoError, RepoResult, product, warehouse, warehouse_unit};
use crate::services::InventoryService;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_price,
    validate_required_text,
};
use shared::models::{
    BucketKey, Condition, Location, Product, ProductCreate, ProductUpdate, Warehouse,
    WarehouseCreate,
};

/// Product-side entry point of the inventory engine.
#[derive(Clone, Debug)]
pub struct CatalogService {
    inventory: InventoryService,
}

impl CatalogService {
    pub fn new(inventory: InventoryService) -> Self {
        Self { inventory }
    }

    fn pool(&self) -> &SqlitePool {
        self.inventory.pool()
    }

    /// Create a product together with its counter record.
    ///
    /// When `initial.price.new` is left at zero it defaults to the product
    /// list price. Every nonzero bucket is reconciled immediately, so a
    /// fresh product has exactly as many trackable units as its initial
    /// stock declares.
    pub async fn create_product(
        &self,
        data: ProductCreate,
        initial: Option<WarehouseCreate>,
    ) -> RepoResult<(Product, Warehouse)> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_required_text(&data.category, "category", MAX_NAME_LEN)?;
        validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
        validate_optional_text(&data.ean_code, "ean_code", MAX_SHORT_TEXT_LEN)?;
        validate_price(data.price, "price")?;

        let list_price = data.price;
        let product = product::create(self.pool(), data).await?;

        let mut counters = initial.unwrap_or_default();
        if counters.price.new == 0.0 {
            counters.price.new = list_price;
        }
        let price = counters.price;
        let warehouse = self.inventory.create_counters(product.id, counters).await?;

        for location in Location::ALL {
            for condition in Condition::ALL {
                let target = warehouse.quantity(location, condition);
                if target > 0 {
                    let bucket = BucketKey::new(product.id, warehouse.id, condition, location);
                    self.inventory
                        .reconcile(bucket, target, Some(price.get(condition)))
                        .await?;
                }
            }
        }
        tracing::info!(
            product_id = product.id,
            warehouse_id = warehouse.id,
            "Product created with warehouse entry"
        );
        Ok((product, warehouse))
    }

    /// Update product fields. A changed, non-empty EAN code is propagated to
    /// all of the product's unit records.
    pub async fn update_product(
        &self,
        product_id: i64,
        data: ProductUpdate,
    ) -> RepoResult<Product> {
        validate_optional_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
        validate_optional_text(&data.ean_code, "ean_code", MAX_SHORT_TEXT_LEN)?;
        if let Some(p) = data.price {
            validate_price(p, "price")?;
        }

        let existing = product::find_by_id(self.pool(), product_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {product_id} not found")))?;

        let new_ean = data.ean_code.clone();
        let updated = product::update(self.pool(), product_id, data).await?;

        if let Some(ean) = new_ean.as_deref()
            && !ean.is_empty()
            && existing.ean_code.as_deref() != Some(ean)
        {
            let touched = warehouse_unit::set_ean_for_product(self.pool(), product_id, ean).await?;
            tracing::info!(
                product_id,
                ean_code = ean,
                touched,
                "Product EAN change propagated to unit records"
            );
        }
        Ok(updated)
    }

    /// Set the product's EAN code and stamp it onto every unit record.
    pub async fn set_product_ean(&self, product_id: i64, ean_code: &str) -> RepoResult<Product> {
        validate_required_text(ean_code, "ean_code", MAX_SHORT_TEXT_LEN)?;
        let updated = product::set_ean(self.pool(), product_id, ean_code).await?;
        warehouse_unit::set_ean_for_product(self.pool(), product_id, ean_code).await?;
        Ok(updated)
    }

    /// Look a product up by EAN code (barcode scan).
    pub async fn find_by_ean(&self, ean_code: &str) -> RepoResult<Option<Product>> {
        product::find_by_ean(self.pool(), ean_code).await
    }

    /// Remove a product. Its counter record and unit records are deleted
    /// with it (foreign-key cascade).
    pub async fn remove_product(&self, product_id: i64) -> RepoResult<()> {
        if !product::delete(self.pool(), product_id).await? {
            return Err(RepoError::NotFound(format!("Product {product_id} not found")));
        }
        tracing::info!(product_id, "Product removed with warehouse entry and units");
        Ok(())
    }

    /// Replace the document references stored on the counter record.
    pub async fn update_warehouse_documents(
        &self,
        product_id: i64,
        documents: Vec<String>,
    ) -> RepoResult<Warehouse> {
        warehouse::update_documents(self.pool(), product_id, documents).await
    }
}
