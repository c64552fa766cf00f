//! Product Repository

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCreate, ProductUpdate};
use sqlx::SqlitePool;

const PRODUCT_SELECT: &str = "SELECT id, name, description, category, sub_category, price, ean_code, serial_number, images, youtube_link, is_bestseller, is_active, created_at, updated_at FROM product";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let sql = format!("{PRODUCT_SELECT} WHERE is_active = 1 ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Product>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let sql = format!("{PRODUCT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn exists(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM product WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn find_by_ean(pool: &SqlitePool, ean_code: &str) -> RepoResult<Option<Product>> {
    let sql = format!("{PRODUCT_SELECT} WHERE ean_code = ?");
    let row = sqlx::query_as::<_, Product>(&sql)
        .bind(ean_code)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let images = data
        .images
        .map(|urls| serde_json::to_string(&urls).unwrap_or_default());
    sqlx::query(
        "INSERT INTO product (id, name, description, category, sub_category, price, ean_code, serial_number, images, youtube_link, is_bestseller, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 1, ?12, ?12)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.category)
    .bind(&data.sub_category)
    .bind(data.price)
    .bind(&data.ean_code)
    .bind(&data.serial_number)
    .bind(&images)
    .bind(&data.youtube_link)
    .bind(data.is_bestseller.unwrap_or(false))
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    let now = shared::util::now_millis();
    let images = data
        .images
        .map(|urls| serde_json::to_string(&urls).unwrap_or_default());
    let rows = sqlx::query(
        "UPDATE product SET name = COALESCE(?1, name), description = COALESCE(?2, description), category = COALESCE(?3, category), sub_category = COALESCE(?4, sub_category), price = COALESCE(?5, price), ean_code = COALESCE(?6, ean_code), images = COALESCE(?7, images), youtube_link = COALESCE(?8, youtube_link), is_bestseller = COALESCE(?9, is_bestseller), is_active = COALESCE(?10, is_active), updated_at = ?11 WHERE id = ?12",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.category)
    .bind(&data.sub_category)
    .bind(data.price)
    .bind(&data.ean_code)
    .bind(&images)
    .bind(&data.youtube_link)
    .bind(data.is_bestseller)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

/// Set the product's EAN code.
pub async fn set_ean(pool: &SqlitePool, id: i64, ean_code: &str) -> RepoResult<Product> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE product SET ean_code = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(ean_code)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

/// Hard delete a product. Warehouse counters and unit records follow via
/// foreign-key cascade.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM product WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
