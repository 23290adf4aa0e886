//! Product Model

use super::ImageRef;
use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// Product ID type
pub type ProductId = RecordId;

/// Catalog category (fixed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Gaming,
    Ultrabook,
    Business,
    Workstation,
    Convertible,
    Budget,
}

/// Customer review, embedded in the product document
///
/// 同一用户对同一商品最多一条评论，重复提交原地覆盖
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Review id (uuid, used by the delete endpoint)
    pub id: String,
    /// Reviewer reference
    #[serde(with = "serde_helpers::record_id")]
    pub reviewer: RecordId,
    /// Display name captured at review time
    pub name: String,
    /// Star rating, 1-5
    pub rating: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub anonymous: bool,
    pub created_at: i64,
}

/// Product model matching the SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<ProductId>,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub brand: String,
    pub processor: String,
    pub ram: String,
    pub storage: String,
    pub screen_size: String,
    pub category: Category,
    /// Inventory count; may go negative under concurrent oversell
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    /// Derived: mean of review ratings, 0 when there are none
    #[serde(default)]
    pub rating: f64,
    /// Derived: number of reviews
    #[serde(default)]
    pub num_reviews: i64,
    /// Optimistic-concurrency counter for review mutations
    #[serde(default)]
    pub revision: i64,
    pub created_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub description: String,
    pub brand: String,
    pub processor: String,
    pub ram: String,
    pub storage: String,
    pub screen_size: String,
    pub category: Category,
    #[validate(range(min = 0))]
    pub stock: i64,
    pub images: Option<Vec<ImageRef>>,
}

/// Update product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageRef>>,
}
