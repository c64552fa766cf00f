//! End-to-end reconciliation flow against a file-backed database.
//!
//! Drives the engine the way the surrounding catalog/order subsystems do:
//! product intake, counter edits, order placement, barcode scan, manual
//! removal, asserting the counter/unit invariant after every step.

use sklad_inventory::db::repository::{warehouse, warehouse_unit};
use sklad_inventory::{CatalogService, DbService, InventoryService};

use shared::models::{
    BucketKey, Condition, Location, OrderLine, PriceLevels, StockLevels, UnitIdentity,
    WarehouseCreate,
};

async fn open_services() -> (tempfile::TempDir, InventoryService, CatalogService) {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("sklad.db");
    let db = DbService::new(&db_path.to_string_lossy())
        .await
        .expect("open database");
    let inventory = InventoryService::new(db.pool.clone());
    let catalog = CatalogService::new(inventory.clone());
    (dir, inventory, catalog)
}

/// Live unit count == counter for every bucket of the product.
async fn assert_buckets_consistent(pool: &sqlx::SqlitePool, product_id: i64) {
    let w = warehouse::find_by_product(pool, product_id)
        .await
        .unwrap()
        .expect("warehouse entry");
    for location in Location::ALL {
        for condition in Condition::ALL {
            let bucket = BucketKey::new(product_id, w.id, condition, location);
            let live = warehouse_unit::count_by_bucket(pool, &bucket).await.unwrap();
            assert_eq!(
                live,
                w.quantity(location, condition),
                "bucket {bucket}: live units diverged from counter"
            );
        }
    }
}

#[tokio::test]
async fn full_product_lifecycle_keeps_counters_and_units_in_step() {
    let (_dir, inventory, catalog) = open_services().await;

    // Intake: a console arrives with three new pieces for the shelf
    let (product, warehouse_entry) = catalog
        .create_product(
            shared::models::ProductCreate {
                name: "PlayStation 5".into(),
                category: "consoles".into(),
                sub_category: Some("current".into()),
                price: 499.0,
                ..Default::default()
            },
            Some(WarehouseCreate {
                quantity_in_stock: StockLevels { new: 3, used: 0 },
                quantity_in_store: StockLevels::default(),
                price: PriceLevels {
                    new: 499.0,
                    used: 0.0,
                },
                documents: None,
            }),
        )
        .await
        .unwrap();
    assert_buckets_consistent(inventory.pool(), product.id).await;

    // Admin edit: one piece moves conceptually to the showroom, a used one
    // turns up in the stockroom
    inventory
        .update_counters(
            product.id,
            StockLevels { new: 2, used: 1 },
            StockLevels { new: 1, used: 0 },
            PriceLevels {
                new: 499.0,
                used: 399.0,
            },
        )
        .await
        .unwrap();
    assert_buckets_consistent(inventory.pool(), product.id).await;

    // A customer buys two new pieces; the counter drops, unit records stay
    // (sold pieces leave the tracked lifecycle through a separate flow)
    inventory
        .decrement_for_order(&[OrderLine {
            product_id: product.id,
            condition: Condition::New,
            quantity: 2,
        }])
        .await
        .unwrap();
    let w = warehouse::find_by_product(inventory.pool(), product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(w.quantity_in_stock_new, 0);

    // Re-align the unit records with the post-sale counters
    let bucket = BucketKey::new(
        product.id,
        warehouse_entry.id,
        Condition::New,
        Location::InStock,
    );
    inventory.reconcile(bucket, 0, None).await.unwrap();
    assert_buckets_consistent(inventory.pool(), product.id).await;

    // The used piece gets scanned: EAN reaches the product and every unit
    let used_bucket = BucketKey::new(
        product.id,
        warehouse_entry.id,
        Condition::Used,
        Location::InStock,
    );
    let used_units = warehouse_unit::find_by_bucket(inventory.pool(), &used_bucket)
        .await
        .unwrap();
    inventory
        .set_unit_identity(
            used_units[0].id,
            UnitIdentity {
                ean_code: Some("0711719541028".into()),
                serial_number: Some("PS5-USED-01".into()),
            },
        )
        .await
        .unwrap();
    let product_after = catalog.find_by_ean("0711719541028").await.unwrap().unwrap();
    assert_eq!(product_after.id, product.id);

    // The scanned piece is pulled from stock by hand
    inventory
        .remove_unit(used_units[0].id, product.id)
        .await
        .unwrap();
    assert_buckets_consistent(inventory.pool(), product.id).await;
}

#[tokio::test]
async fn reconcile_passes_on_disjoint_buckets_are_independent() {
    let (_dir, inventory, catalog) = open_services().await;
    let (product, warehouse_entry) = catalog
        .create_product(
            shared::models::ProductCreate {
                name: "Xbox Series X".into(),
                category: "consoles".into(),
                price: 449.0,
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    let stock_new = BucketKey::new(
        product.id,
        warehouse_entry.id,
        Condition::New,
        Location::InStock,
    );
    let store_used = BucketKey::new(
        product.id,
        warehouse_entry.id,
        Condition::Used,
        Location::InStore,
    );

    // Buckets are disjoint by key, so concurrent passes may interleave freely
    let (a, b) = tokio::join!(
        inventory.reconcile(stock_new, 4, Some(449.0)),
        inventory.reconcile(store_used, 2, Some(299.0))
    );
    assert_eq!(a.unwrap().created, 4);
    assert_eq!(b.unwrap().created, 2);

    assert_eq!(
        warehouse_unit::count_by_bucket(inventory.pool(), &stock_new)
            .await
            .unwrap(),
        4
    );
    assert_eq!(
        warehouse_unit::count_by_bucket(inventory.pool(), &store_used)
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn repeated_reconcile_repairs_towards_latest_target() {
    let (_dir, inventory, catalog) = open_services().await;
    let (product, warehouse_entry) = catalog
        .create_product(
            shared::models::ProductCreate {
                name: "Wii U".into(),
                category: "consoles".into(),
                price: 120.0,
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    let bucket = BucketKey::new(
        product.id,
        warehouse_entry.id,
        Condition::New,
        Location::InStock,
    );

    // The documented recovery path after a partial failure is to call
    // reconcile again with the same target: converges and then no-ops.
    for _ in 0..3 {
        inventory.reconcile(bucket, 6, None).await.unwrap();
    }
    let outcome = inventory.reconcile(bucket, 6, None).await.unwrap();
    assert_eq!(outcome.previous, 6);
    assert_eq!(outcome.created + outcome.deleted, 0);
}
