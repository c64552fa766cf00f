//! Inventory Service - aggregate stock counters and warehouse unit records
//!
//! The four counters on a warehouse row are the *intended* per-bucket
//! counts. [`InventoryService::reconcile`] materializes them: it creates or
//! deletes unit records until the live count for a bucket matches the
//! target. Individual record writes are not atomic as a group (a failure
//! partway leaves a mix the next call with the same target repairs), but
//! reconciliation is serialized per bucket, so two concurrent passes can
//! never race each other past the target.

use dashmap::DashMap;
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::repository::{RepoError, RepoResult, product, warehouse, warehouse_unit};
use crate::utils::validation::{
    MAX_SHORT_TEXT_LEN, validate_optional_text, validate_price, validate_quantity,
};
use shared::models::{
    BucketKey, Condition, Location, OrderLine, PriceLevels, StockLevels, UnitIdentity, Warehouse,
    WarehouseCreate, WarehouseUnit, WarehouseUnitCreate,
};

/// Result of one reconciliation pass over a single bucket.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileOutcome {
    pub bucket: BucketKey,
    /// Live unit count before the pass
    pub previous: i64,
    /// Intended count the pass drove towards
    pub target: i64,
    pub created: i64,
    pub deleted: i64,
}

/// Inventory engine entry point.
///
/// Cheap to clone; the per-bucket lock registry is shared across clones so
/// every caller contends on the same mutex for a given bucket.
#[derive(Clone)]
pub struct InventoryService {
    pool: SqlitePool,
    bucket_locks: Arc<DashMap<BucketKey, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for InventoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryService")
            .field("tracked_buckets", &self.bucket_locks.len())
            .finish()
    }
}

impl InventoryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            bucket_locks: Arc::new(DashMap::new()),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn lock_for(&self, bucket: BucketKey) -> Arc<Mutex<()>> {
        self.bucket_locks
            .entry(bucket)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // =========================================================================
    // Aggregate counter lifecycle
    // =========================================================================

    /// Insert a counter record for a product.
    ///
    /// Does not materialize unit records; product-creation flows call
    /// [`reconcile`](Self::reconcile) per nonzero bucket afterwards.
    pub async fn create_counters(
        &self,
        product_id: i64,
        data: WarehouseCreate,
    ) -> RepoResult<Warehouse> {
        if !product::exists(&self.pool, product_id).await? {
            return Err(RepoError::Validation(format!(
                "product {product_id} does not exist"
            )));
        }
        Self::validate_levels(&data.quantity_in_stock, &data.quantity_in_store, &data.price)?;
        if warehouse::find_by_product(&self.pool, product_id).await?.is_some() {
            return Err(RepoError::Validation(format!(
                "product {product_id} already has a warehouse entry"
            )));
        }
        let created = warehouse::create(&self.pool, product_id, data).await?;
        tracing::info!(product_id, warehouse_id = created.id, "Warehouse entry created");
        Ok(created)
    }

    /// Upsert the counter record and align unit records with it.
    ///
    /// Counters and prices are overwritten wholesale; afterwards every
    /// bucket whose target changed is reconciled once, using the new value
    /// as target and the matching condition price for created units.
    pub async fn update_counters(
        &self,
        product_id: i64,
        in_stock: StockLevels,
        in_store: StockLevels,
        price: PriceLevels,
    ) -> RepoResult<(Warehouse, Vec<ReconcileOutcome>)> {
        Self::validate_levels(&in_stock, &in_store, &price)?;

        let existing = warehouse::find_by_product(&self.pool, product_id).await?;
        let updated = match &existing {
            Some(_) => {
                warehouse::overwrite_counters(&self.pool, product_id, in_stock, in_store, price)
                    .await?
            }
            None => {
                self.create_counters(
                    product_id,
                    WarehouseCreate {
                        quantity_in_stock: in_stock,
                        quantity_in_store: in_store,
                        price,
                        documents: None,
                    },
                )
                .await?
            }
        };

        let mut outcomes = Vec::new();
        for location in Location::ALL {
            for condition in Condition::ALL {
                let target = updated.quantity(location, condition);
                let old = existing
                    .as_ref()
                    .map(|w| w.quantity(location, condition))
                    .unwrap_or(0);
                if existing.is_some() && target == old {
                    continue;
                }
                let bucket = BucketKey::new(product_id, updated.id, condition, location);
                outcomes.push(
                    self.reconcile(bucket, target, Some(price.get(condition)))
                        .await?,
                );
            }
        }
        Ok((updated, outcomes))
    }

    /// Atomically add `delta` to one bucket's counter, clamped at zero.
    ///
    /// Pure counter mutation, unit records are left alone. Order placement
    /// uses this to record "units left the tracked lifecycle via sale".
    pub async fn adjust_counter_by(
        &self,
        product_id: i64,
        location: Location,
        condition: Condition,
        delta: i64,
    ) -> RepoResult<Warehouse> {
        warehouse::adjust_quantity(&self.pool, product_id, location, condition, delta).await
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Align a bucket's live unit records with `target_count`.
    ///
    /// Missing units are created anonymous (empty EAN/serial) with
    /// `unit_price` (0 if not supplied); surplus units are deleted, anonymous
    /// victims first. Post-condition on success: live count == target.
    pub async fn reconcile(
        &self,
        bucket: BucketKey,
        target_count: i64,
        unit_price: Option<f64>,
    ) -> RepoResult<ReconcileOutcome> {
        validate_quantity(target_count, "target count")?;

        let lock = self.lock_for(bucket);
        let _guard = lock.lock().await;

        let previous = warehouse_unit::count_by_bucket(&self.pool, &bucket)
            .await
            .map_err(|e| e.in_bucket(&bucket))?;

        let mut created = 0;
        let mut deleted = 0;
        if target_count > previous {
            let price = unit_price.unwrap_or(0.0);
            for _ in previous..target_count {
                // Independent inserts: a failure partway leaves a shortfall
                // the next call with the same target fills in.
                warehouse_unit::insert(&self.pool, WarehouseUnitCreate::blank(bucket, price))
                    .await
                    .map_err(|e| e.in_bucket(&bucket))?;
                created += 1;
            }
        } else if target_count < previous {
            deleted = warehouse_unit::delete_surplus(&self.pool, &bucket, previous - target_count)
                .await
                .map_err(|e| e.in_bucket(&bucket))?;
        }

        if created > 0 || deleted > 0 {
            tracing::info!(
                bucket = %bucket,
                previous,
                target = target_count,
                created,
                deleted,
                "Reconciled warehouse units"
            );
        }
        Ok(ReconcileOutcome {
            bucket,
            previous,
            target: target_count,
            created,
            deleted,
        })
    }

    // =========================================================================
    // Unit identity and removal
    // =========================================================================

    /// Attach identity (EAN / serial) to a unit.
    ///
    /// A non-empty EAN code also propagates to the owning product and to
    /// every sibling unit of that product (a bulk field update, counts are
    /// unaffected).
    pub async fn set_unit_identity(
        &self,
        unit_id: i64,
        identity: UnitIdentity,
    ) -> RepoResult<WarehouseUnit> {
        validate_optional_text(&identity.ean_code, "ean_code", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&identity.serial_number, "serial_number", MAX_SHORT_TEXT_LEN)?;

        let updated = warehouse_unit::update_identity(&self.pool, unit_id, &identity).await?;

        if let Some(ean) = identity.ean_code.as_deref()
            && !ean.is_empty()
        {
            product::set_ean(&self.pool, updated.product_id, ean).await?;
            let siblings =
                warehouse_unit::set_ean_for_product(&self.pool, updated.product_id, ean).await?;
            tracing::info!(
                unit_id,
                product_id = updated.product_id,
                ean_code = ean,
                siblings,
                "EAN code propagated to product and sibling units"
            );
        }
        Ok(updated)
    }

    /// Delete a unit and decrement the matching bucket counter by one,
    /// floored at zero. Runs in a single transaction: a missing counter
    /// record fails the removal and keeps the unit.
    pub async fn remove_unit(&self, unit_id: i64, product_id: i64) -> RepoResult<WarehouseUnit> {
        if !product::exists(&self.pool, product_id).await? {
            return Err(RepoError::Validation(format!(
                "product {product_id} does not exist"
            )));
        }
        let removed =
            warehouse_unit::delete_with_counter_decrement(&self.pool, unit_id, product_id).await?;
        tracing::info!(
            unit_id,
            product_id,
            condition = %removed.condition,
            location = %removed.location,
            "Warehouse unit removed, counter decremented"
        );
        Ok(removed)
    }

    // =========================================================================
    // Order and manual-intake hooks
    // =========================================================================

    /// Decrement in-stock counters for the lines of a placed order.
    ///
    /// Counter-only: no specific unit record is selected as sold. Lines
    /// referencing a product without a counter record are logged and
    /// skipped, matching the tolerant order-placement flow.
    pub async fn decrement_for_order(&self, lines: &[OrderLine]) -> RepoResult<()> {
        for line in lines {
            if line.quantity <= 0 {
                return Err(RepoError::Validation(format!(
                    "order line for product {} has non-positive quantity {}",
                    line.product_id, line.quantity
                )));
            }
            match self
                .adjust_counter_by(
                    line.product_id,
                    Location::InStock,
                    line.condition,
                    -line.quantity,
                )
                .await
            {
                Ok(w) => {
                    tracing::debug!(
                        product_id = line.product_id,
                        condition = %line.condition,
                        quantity = line.quantity,
                        remaining = w.quantity(Location::InStock, line.condition),
                        "Stock decremented for order line"
                    );
                }
                Err(RepoError::NotFound(msg)) => {
                    tracing::warn!(
                        product_id = line.product_id,
                        "Order line skipped, no counter record: {msg}"
                    );
                }
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    /// Manual intake: bump one bucket's counter by `amount` and create that
    /// many unit records inheriting the product's EAN and list price.
    ///
    /// Counter and units move together here, so no reconciliation pass is
    /// needed afterwards.
    pub async fn add_units(
        &self,
        product_id: i64,
        location: Location,
        condition: Condition,
        amount: i64,
    ) -> RepoResult<(Warehouse, Vec<WarehouseUnit>)> {
        if amount <= 0 {
            return Err(RepoError::Validation(format!(
                "amount must be positive (got {amount})"
            )));
        }
        let product = product::find_by_id(&self.pool, product_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {product_id} not found")))?;

        // Create the counter record on first intake
        let existing = match warehouse::find_by_product(&self.pool, product_id).await? {
            Some(w) => w,
            None => warehouse::create(&self.pool, product_id, WarehouseCreate::default()).await?,
        };

        let bucket = BucketKey::new(product_id, existing.id, condition, location);
        let lock = self.lock_for(bucket);
        let _guard = lock.lock().await;

        let updated =
            warehouse::adjust_quantity(&self.pool, product_id, location, condition, amount).await?;

        let ean_code = product.ean_code.unwrap_or_default();
        let mut units = Vec::with_capacity(amount as usize);
        for _ in 0..amount {
            let unit = warehouse_unit::insert(
                &self.pool,
                WarehouseUnitCreate {
                    product_id,
                    warehouse_id: existing.id,
                    condition,
                    location,
                    ean_code: ean_code.clone(),
                    serial_number: String::new(),
                    price: product.price,
                },
            )
            .await
            .map_err(|e| e.in_bucket(&bucket))?;
            units.push(unit);
        }
        tracing::info!(bucket = %bucket, amount, "Manual intake recorded");
        Ok((updated, units))
    }

    fn validate_levels(
        in_stock: &StockLevels,
        in_store: &StockLevels,
        price: &PriceLevels,
    ) -> RepoResult<()> {
        validate_quantity(in_stock.new, "quantity_in_stock.new")?;
        validate_quantity(in_stock.used, "quantity_in_stock.used")?;
        validate_quantity(in_store.new, "quantity_in_store.new")?;
        validate_quantity(in_store.used, "quantity_in_store.used")?;
        validate_price(price.new, "price.new")?;
        validate_price(price.used, "price.used")?;
        Ok(())
    }
}
