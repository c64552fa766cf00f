//! Warehouse Unit Repository (individually tracked items)

use super::{RepoError, RepoResult, warehouse};
use shared::models::{BucketKey, UnitIdentity, WarehouseUnit, WarehouseUnitCreate};
use sqlx::SqlitePool;

const UNIT_SELECT: &str = "SELECT id, product_id, warehouse_id, condition, location, ean_code, serial_number, price, created_at, updated_at FROM warehouse_unit";

const BUCKET_WHERE: &str =
    "product_id = ?1 AND warehouse_id = ?2 AND condition = ?3 AND location = ?4";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<WarehouseUnit>> {
    let sql = format!("{UNIT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, WarehouseUnit>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_product(pool: &SqlitePool, product_id: i64) -> RepoResult<Vec<WarehouseUnit>> {
    let sql = format!("{UNIT_SELECT} WHERE product_id = ? ORDER BY id");
    let rows = sqlx::query_as::<_, WarehouseUnit>(&sql)
        .bind(product_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Live unit records for one bucket.
pub async fn find_by_bucket(pool: &SqlitePool, bucket: &BucketKey) -> RepoResult<Vec<WarehouseUnit>> {
    let sql = format!("{UNIT_SELECT} WHERE {BUCKET_WHERE} ORDER BY id");
    let rows = sqlx::query_as::<_, WarehouseUnit>(&sql)
        .bind(bucket.product_id)
        .bind(bucket.warehouse_id)
        .bind(bucket.condition)
        .bind(bucket.location)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Live unit count for one bucket.
pub async fn count_by_bucket(pool: &SqlitePool, bucket: &BucketKey) -> RepoResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM warehouse_unit WHERE {BUCKET_WHERE}");
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(bucket.product_id)
        .bind(bucket.warehouse_id)
        .bind(bucket.condition)
        .bind(bucket.location)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn insert(pool: &SqlitePool, data: WarehouseUnitCreate) -> RepoResult<WarehouseUnit> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO warehouse_unit (id, product_id, warehouse_id, condition, location, ean_code, serial_number, price, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
    )
    .bind(id)
    .bind(data.product_id)
    .bind(data.warehouse_id)
    .bind(data.condition)
    .bind(data.location)
    .bind(&data.ean_code)
    .bind(&data.serial_number)
    .bind(data.price)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database(format!("Failed to create warehouse unit for product {}", data.product_id)))
}

/// Delete up to `surplus` units from a bucket, returning how many went.
///
/// Victim policy: anonymous units (no EAN, no serial) go first, newest
/// first within each class, so identified physical pieces survive a
/// shrinking target for as long as possible. Deletes are issued one by
/// one; a failure partway leaves the bucket recoverable by re-running
/// reconciliation with the same target.
pub async fn delete_surplus(pool: &SqlitePool, bucket: &BucketKey, surplus: i64) -> RepoResult<i64> {
    let sql = format!(
        "SELECT id FROM warehouse_unit WHERE {BUCKET_WHERE} ORDER BY (ean_code = '' AND serial_number = '') DESC, id DESC LIMIT ?5"
    );
    let victims: Vec<i64> = sqlx::query_scalar(&sql)
        .bind(bucket.product_id)
        .bind(bucket.warehouse_id)
        .bind(bucket.condition)
        .bind(bucket.location)
        .bind(surplus)
        .fetch_all(pool)
        .await?;

    let mut deleted = 0;
    for id in victims {
        let rows = sqlx::query("DELETE FROM warehouse_unit WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        deleted += rows.rows_affected() as i64;
    }
    Ok(deleted)
}

/// Update a unit's identity fields (EAN / serial number).
pub async fn update_identity(
    pool: &SqlitePool,
    id: i64,
    identity: &UnitIdentity,
) -> RepoResult<WarehouseUnit> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE warehouse_unit SET ean_code = COALESCE(?1, ean_code), serial_number = COALESCE(?2, serial_number), updated_at = ?3 WHERE id = ?4",
    )
    .bind(&identity.ean_code)
    .bind(&identity.serial_number)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Warehouse unit {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Warehouse unit {id} not found")))
}

/// Stamp an EAN code onto every unit of a product (bulk field update;
/// counts are unaffected). Returns the number of touched rows.
pub async fn set_ean_for_product(
    pool: &SqlitePool,
    product_id: i64,
    ean_code: &str,
) -> RepoResult<u64> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE warehouse_unit SET ean_code = ?1, updated_at = ?2 WHERE product_id = ?3",
    )
    .bind(ean_code)
    .bind(now)
    .bind(product_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM warehouse_unit WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Delete a unit and decrement the matching bucket counter, floored at 0,
/// in one transaction.
///
/// If the product has no counter record the whole operation rolls back and
/// the unit stays put; a failed removal never strands stale counters.
pub async fn delete_with_counter_decrement(
    pool: &SqlitePool,
    unit_id: i64,
    product_id: i64,
) -> RepoResult<WarehouseUnit> {
    let unit = find_by_id(pool, unit_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Warehouse unit {unit_id} not found")))?;
    if unit.product_id != product_id {
        return Err(RepoError::Validation(format!(
            "Warehouse unit {unit_id} does not belong to product {product_id}"
        )));
    }

    let column = warehouse::quantity_column(unit.location, unit.condition);
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    let rows = sqlx::query("DELETE FROM warehouse_unit WHERE id = ?")
        .bind(unit_id)
        .execute(&mut *tx)
        .await?;
    if rows.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(RepoError::NotFound(format!("Warehouse unit {unit_id} not found")));
    }

    let sql = format!(
        "UPDATE warehouse SET {column} = MAX(0, {column} - 1), updated_at = ?1 WHERE product_id = ?2"
    );
    let rows = sqlx::query(&sql)
        .bind(now)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;
    if rows.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(RepoError::NotFound(format!(
            "Warehouse entry for product {product_id} not found"
        )));
    }

    tx.commit().await?;
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Condition, Location, ProductCreate, WarehouseCreate};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("PRAGMA foreign_keys = ON;")
            .execute(&pool)
            .await
            .unwrap();
        crate::db::MIGRATOR.run(&pool).await.unwrap();
        pool
    }

    /// Seed one product with a zeroed warehouse, return its bucket.
    async fn seed_bucket(pool: &SqlitePool) -> BucketKey {
        let product = super::super::product::create(
            pool,
            ProductCreate {
                name: "Dreamcast".into(),
                category: "consoles".into(),
                price: 90.0,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let warehouse = warehouse::create(pool, product.id, WarehouseCreate::default())
            .await
            .unwrap();
        BucketKey::new(product.id, warehouse.id, Condition::New, Location::InStock)
    }

    #[tokio::test]
    async fn insert_and_count_by_bucket() {
        let pool = test_pool().await;
        let bucket = seed_bucket(&pool).await;

        for _ in 0..3 {
            insert(&pool, WarehouseUnitCreate::blank(bucket, 90.0))
                .await
                .unwrap();
        }
        assert_eq!(count_by_bucket(&pool, &bucket).await.unwrap(), 3);

        // A different bucket of the same product stays empty
        let other = BucketKey {
            location: Location::InStore,
            ..bucket
        };
        assert_eq!(count_by_bucket(&pool, &other).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_surplus_prefers_anonymous_units() {
        let pool = test_pool().await;
        let bucket = seed_bucket(&pool).await;

        let tagged = insert(&pool, WarehouseUnitCreate::blank(bucket, 0.0))
            .await
            .unwrap();
        update_identity(
            &pool,
            tagged.id,
            &UnitIdentity {
                ean_code: Some("8591234567890".into()),
                serial_number: Some("SN-001".into()),
            },
        )
        .await
        .unwrap();
        insert(&pool, WarehouseUnitCreate::blank(bucket, 0.0))
            .await
            .unwrap();
        insert(&pool, WarehouseUnitCreate::blank(bucket, 0.0))
            .await
            .unwrap();

        let deleted = delete_surplus(&pool, &bucket, 2).await.unwrap();
        assert_eq!(deleted, 2);

        // The identified unit must be the survivor
        let remaining = find_by_bucket(&pool, &bucket).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, tagged.id);
        assert_eq!(remaining[0].serial_number, "SN-001");
    }

    #[tokio::test]
    async fn set_ean_for_product_touches_every_unit() {
        let pool = test_pool().await;
        let bucket = seed_bucket(&pool).await;
        for _ in 0..4 {
            insert(&pool, WarehouseUnitCreate::blank(bucket, 0.0))
                .await
                .unwrap();
        }

        let touched = set_ean_for_product(&pool, bucket.product_id, "8590000000017")
            .await
            .unwrap();
        assert_eq!(touched, 4);
        for unit in find_by_product(&pool, bucket.product_id).await.unwrap() {
            assert_eq!(unit.ean_code, "8590000000017");
        }
    }

    #[tokio::test]
    async fn delete_with_counter_decrement_is_transactional() {
        let pool = test_pool().await;
        let bucket = seed_bucket(&pool).await;
        warehouse::adjust_quantity(&pool, bucket.product_id, bucket.location, bucket.condition, 1)
            .await
            .unwrap();
        let unit = insert(&pool, WarehouseUnitCreate::blank(bucket, 0.0))
            .await
            .unwrap();

        // Second product without a warehouse, claiming the same unit id,
        // must fail before anything is written.
        let err = delete_with_counter_decrement(&pool, unit.id, bucket.product_id + 1)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert!(find_by_id(&pool, unit.id).await.unwrap().is_some());

        // The real owner removes it: unit gone, counter back to zero.
        delete_with_counter_decrement(&pool, unit.id, bucket.product_id)
            .await
            .unwrap();
        assert!(find_by_id(&pool, unit.id).await.unwrap().is_none());
        let w = warehouse::find_by_product(&pool, bucket.product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(w.quantity_in_stock_new, 0);
    }
}
