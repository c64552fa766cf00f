//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity (catalog entry)
///
/// `images` holds a JSON-encoded array of image URLs; `ean_code` is empty
/// until the first physical unit is identified, after which it must match
/// the EAN of every associated warehouse unit (eventual propagation).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub sub_category: Option<String>,
    /// List price for a unit in "new" condition
    pub price: f64,
    pub ean_code: Option<String>,
    pub serial_number: Option<String>,
    /// JSON array of image URLs
    pub images: Option<String>,
    pub youtube_link: Option<String>,
    pub is_bestseller: bool,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub sub_category: Option<String>,
    pub price: f64,
    pub ean_code: Option<String>,
    pub serial_number: Option<String>,
    pub images: Option<Vec<String>>,
    pub youtube_link: Option<String>,
    pub is_bestseller: Option<bool>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub price: Option<f64>,
    pub ean_code: Option<String>,
    pub images: Option<Vec<String>>,
    pub youtube_link: Option<String>,
    pub is_bestseller: Option<bool>,
    pub is_active: Option<bool>,
}
