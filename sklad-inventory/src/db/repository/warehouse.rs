//! Warehouse Repository (aggregate counter records)

use super::{RepoError, RepoResult};
use shared::models::{Condition, Location, PriceLevels, StockLevels, Warehouse, WarehouseCreate};
use sqlx::SqlitePool;

const WAREHOUSE_SELECT: &str = "SELECT id, product_id, quantity_in_stock_new, quantity_in_stock_used, quantity_in_store_new, quantity_in_store_used, price_new, price_used, documents, created_at, updated_at FROM warehouse";

/// Column holding the counter for one bucket.
///
/// Keyed by (location, condition) so every caller resolves counter columns
/// the same way; there is exactly one column per bucket.
pub(crate) fn quantity_column(location: Location, condition: Condition) -> &'static str {
    match (location, condition) {
        (Location::InStock, Condition::New) => "quantity_in_stock_new",
        (Location::InStock, Condition::Used) => "quantity_in_stock_used",
        (Location::InStore, Condition::New) => "quantity_in_store_new",
        (Location::InStore, Condition::Used) => "quantity_in_store_used",
    }
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Warehouse>> {
    let sql = format!("{WAREHOUSE_SELECT} ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Warehouse>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Warehouse>> {
    let sql = format!("{WAREHOUSE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Warehouse>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_product(pool: &SqlitePool, product_id: i64) -> RepoResult<Option<Warehouse>> {
    let sql = format!("{WAREHOUSE_SELECT} WHERE product_id = ?");
    let row = sqlx::query_as::<_, Warehouse>(&sql)
        .bind(product_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(
    pool: &SqlitePool,
    product_id: i64,
    data: WarehouseCreate,
) -> RepoResult<Warehouse> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let documents = data
        .documents
        .map(|urls| serde_json::to_string(&urls).unwrap_or_default());
    sqlx::query(
        "INSERT INTO warehouse (id, product_id, quantity_in_stock_new, quantity_in_stock_used, quantity_in_store_new, quantity_in_store_used, price_new, price_used, documents, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
    )
    .bind(id)
    .bind(product_id)
    .bind(data.quantity_in_stock.new)
    .bind(data.quantity_in_stock.used)
    .bind(data.quantity_in_store.new)
    .bind(data.quantity_in_store.used)
    .bind(data.price.new)
    .bind(data.price.used)
    .bind(&documents)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database(format!("Failed to create warehouse for product {product_id}")))
}

/// Overwrite all four counters and both prices wholesale (not incrementally).
pub async fn overwrite_counters(
    pool: &SqlitePool,
    product_id: i64,
    in_stock: StockLevels,
    in_store: StockLevels,
    price: PriceLevels,
) -> RepoResult<Warehouse> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE warehouse SET quantity_in_stock_new = ?1, quantity_in_stock_used = ?2, quantity_in_store_new = ?3, quantity_in_store_used = ?4, price_new = ?5, price_used = ?6, updated_at = ?7 WHERE product_id = ?8",
    )
    .bind(in_stock.new)
    .bind(in_stock.used)
    .bind(in_store.new)
    .bind(in_store.used)
    .bind(price.new)
    .bind(price.used)
    .bind(now)
    .bind(product_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Warehouse entry for product {product_id} not found"
        )));
    }
    find_by_product(pool, product_id).await?.ok_or_else(|| {
        RepoError::NotFound(format!("Warehouse entry for product {product_id} not found"))
    })
}

/// Atomically add `delta` to one bucket's counter, clamped at zero.
///
/// Single-statement `MAX(0, ...)` update, so concurrent adjustments cannot
/// drive the counter negative or lose increments.
pub async fn adjust_quantity(
    pool: &SqlitePool,
    product_id: i64,
    location: Location,
    condition: Condition,
    delta: i64,
) -> RepoResult<Warehouse> {
    let column = quantity_column(location, condition);
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE warehouse SET {column} = MAX(0, {column} + ?1), updated_at = ?2 WHERE product_id = ?3"
    );
    let rows = sqlx::query(&sql)
        .bind(delta)
        .bind(now)
        .bind(product_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Warehouse entry for product {product_id} not found"
        )));
    }
    find_by_product(pool, product_id).await?.ok_or_else(|| {
        RepoError::NotFound(format!("Warehouse entry for product {product_id} not found"))
    })
}

/// Replace the document references on a counter record.
pub async fn update_documents(
    pool: &SqlitePool,
    product_id: i64,
    documents: Vec<String>,
) -> RepoResult<Warehouse> {
    let now = shared::util::now_millis();
    let encoded = serde_json::to_string(&documents)
        .map_err(|e| RepoError::Validation(format!("documents not serializable: {e}")))?;
    let rows =
        sqlx::query("UPDATE warehouse SET documents = ?1, updated_at = ?2 WHERE product_id = ?3")
            .bind(&encoded)
            .bind(now)
            .bind(product_id)
            .execute(pool)
            .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Warehouse entry for product {product_id} not found"
        )));
    }
    find_by_product(pool, product_id).await?.ok_or_else(|| {
        RepoError::NotFound(format!("Warehouse entry for product {product_id} not found"))
    })
}
