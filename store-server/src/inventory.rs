//! Inventory Adjuster
//!
//! Applies signed stock deltas to product records. An adjustment never
//! fails its caller: a missing product is logged and skipped, and errors
//! are logged and swallowed, so order processing is never blocked by
//! inventory bookkeeping.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::RecordId;

use crate::db::repository::ProductRepository;

/// Direction of a stock adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    Subtract,
    Add,
}

#[derive(Clone)]
pub struct InventoryAdjuster {
    products: ProductRepository,
}

impl InventoryAdjuster {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db),
        }
    }

    /// Apply `stock ± quantity` to the product as one atomic statement.
    ///
    /// 负库存表示超卖，不做 clamp（见 DESIGN.md）
    pub async fn adjust(&self, product_id: &RecordId, quantity: i32, direction: StockDirection) {
        let delta = match direction {
            StockDirection::Subtract => -(quantity as i64),
            StockDirection::Add => quantity as i64,
        };

        match self.products.adjust_stock(product_id, delta).await {
            Ok(Some(product)) => {
                tracing::debug!(
                    product = %product_id,
                    delta,
                    stock = product.stock,
                    "Stock adjusted"
                );
                if product.stock < 0 {
                    tracing::warn!(
                        product = %product_id,
                        stock = product.stock,
                        "Stock went negative (oversell)"
                    );
                }
            }
            Ok(None) => {
                tracing::warn!(
                    product = %product_id,
                    delta,
                    "Stock adjustment skipped - product not found"
                );
            }
            Err(e) => {
                tracing::error!(
                    product = %product_id,
                    delta,
                    error = %e,
                    "Stock adjustment failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{Category, ProductCreate};
    use crate::db::repository::make_record_id;

    async fn setup() -> (InventoryAdjuster, ProductRepository) {
        let svc = DbService::memory().await.expect("in-memory db");
        (
            InventoryAdjuster::new(svc.db.clone()),
            ProductRepository::new(svc.db),
        )
    }

    fn laptop(stock: i64) -> ProductCreate {
        ProductCreate {
            name: "Swift 14".to_string(),
            price: 999.0,
            description: String::new(),
            brand: "Acme".to_string(),
            processor: "8-core".to_string(),
            ram: "16GB".to_string(),
            storage: "512GB".to_string(),
            screen_size: "14\"".to_string(),
            category: Category::Ultrabook,
            stock,
            images: None,
        }
    }

    #[tokio::test]
    async fn test_subtract_and_add() {
        let (adjuster, products) = setup().await;
        let created = products.create(laptop(10)).await.unwrap();
        let rid = created.id.clone().unwrap();
        let id = rid.to_string();

        adjuster.adjust(&rid, 3, StockDirection::Subtract).await;
        assert_eq!(products.find_by_id(&id).await.unwrap().unwrap().stock, 7);

        adjuster.adjust(&rid, 3, StockDirection::Add).await;
        assert_eq!(products.find_by_id(&id).await.unwrap().unwrap().stock, 10);
    }

    #[tokio::test]
    async fn test_oversell_goes_negative() {
        let (adjuster, products) = setup().await;
        let created = products.create(laptop(1)).await.unwrap();
        let rid = created.id.clone().unwrap();

        adjuster.adjust(&rid, 4, StockDirection::Subtract).await;
        let stock = products
            .find_by_id(&rid.to_string())
            .await
            .unwrap()
            .unwrap()
            .stock;
        assert_eq!(stock, -3);
    }

    #[tokio::test]
    async fn test_missing_product_is_a_noop() {
        let (adjuster, _) = setup().await;
        let rid = make_record_id("product", "ghost");
        // Must not panic or error out
        adjuster.adjust(&rid, 5, StockDirection::Subtract).await;
    }
}
