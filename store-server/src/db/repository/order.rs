//! Order Repository
//!
//! Order references (user, line-item products) are stored as "table:id"
//! strings; queries bind the same string form.

use super::{BaseRepository, RepoError, RepoResult, make_record_id};
use crate::db::models::{Order, serde_helpers};
use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const ORDER_TABLE: &str = "order";

/// One row of the per-customer spend aggregation
#[derive(Debug, Deserialize)]
pub struct CustomerTotalRow {
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub total: f64,
    pub orders: i64,
}

/// Projection used by the per-month revenue aggregation
#[derive(Debug, Deserialize)]
pub struct PaidOrderRow {
    pub paid_at: i64,
    pub total_price: f64,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct SumRow {
    total: f64,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a new order
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let rid = make_record_id(ORDER_TABLE, id);
        let order: Option<Order> = self.base.db().select(rid).await?;
        Ok(order)
    }

    /// All orders of one user, newest first
    pub async fn find_by_user(&self, user: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE user = $user ORDER BY created_at DESC")
            .bind(("user", user.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// All orders, newest first (admin)
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Write the status-transition fields in one statement
    pub async fn apply_status(&self, id: &RecordId, order: &Order) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET status = $status, payment = $payment, \
                 paid_at = $paid_at, delivered_at = $delivered_at, \
                 cancelled_at = $cancelled_at RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("status", order.status))
            .bind(("payment", order.payment.clone()))
            .bind(("paid_at", order.paid_at))
            .bind(("delivered_at", order.delivered_at))
            .bind(("cancelled_at", order.cancelled_at))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// Unconditional hard delete. No inventory reversal here.
    pub async fn delete(&self, id: &str) -> RepoResult<Order> {
        let rid = make_record_id(ORDER_TABLE, id);
        let deleted: Option<Order> = self.base.db().delete(rid).await?;
        deleted.ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// Review eligibility probe: does the user hold a DELIVERED order
    /// containing this product?
    pub async fn has_delivered_containing(
        &self,
        user: &RecordId,
        product: &RecordId,
    ) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT id FROM order WHERE user = $user AND status = 'DELIVERED' \
                 AND items.product CONTAINS $product LIMIT 1",
            )
            .bind(("user", user.to_string()))
            .bind(("product", product.to_string()))
            .await?;
        let rows: Vec<serde_json::Value> = result.take(0)?;
        Ok(!rows.is_empty())
    }

    // ==================== Reporting aggregations ====================

    /// Total order count
    pub async fn count_all(&self) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() AS count FROM order GROUP ALL")
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }

    /// Sum of total_price across all orders
    pub async fn sum_total(&self) -> RepoResult<f64> {
        let mut result = self
            .base
            .db()
            .query("SELECT math::sum(total_price) AS total FROM order GROUP ALL")
            .await?;
        let rows: Vec<SumRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0.0))
    }

    /// Per-customer spend, grouped in the database
    pub async fn customer_totals(&self) -> RepoResult<Vec<CustomerTotalRow>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT user, math::sum(total_price) AS total, count() AS orders \
                 FROM order GROUP BY user",
            )
            .await?;
        let rows: Vec<CustomerTotalRow> = result.take(0)?;
        Ok(rows)
    }

    /// Paid orders projected to (paid_at, total_price), for the per-month
    /// revenue grouping
    pub async fn paid_orders(&self) -> RepoResult<Vec<PaidOrderRow>> {
        let mut result = self
            .base
            .db()
            .query("SELECT paid_at, total_price FROM order WHERE paid_at != NONE")
            .await?;
        let rows: Vec<PaidOrderRow> = result.take(0)?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{
        OrderItem, OrderStatus, PaymentInfo, PaymentStatus, ShippingInfo,
    };

    pub(crate) fn shipping() -> ShippingInfo {
        ShippingInfo {
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            postal_code: "12345".to_string(),
            country: "US".to_string(),
            phone: "555-0100".to_string(),
        }
    }

    fn order_for(user: &RecordId, product: &RecordId, total: f64, status: OrderStatus) -> Order {
        Order {
            id: None,
            user: user.clone(),
            items: vec![OrderItem {
                product: product.clone(),
                name: "Swift 14".to_string(),
                price: total,
                quantity: 1,
                image: None,
            }],
            shipping: shipping(),
            items_price: total,
            tax_price: 0.0,
            shipping_price: 0.0,
            total_price: total,
            payment: PaymentInfo {
                method: "card".to_string(),
                status: PaymentStatus::Paid,
            },
            status,
            created_at: shared::util::now_millis(),
            paid_at: Some(shared::util::now_millis()),
            delivered_at: None,
            cancelled_at: None,
        }
    }

    async fn test_repo() -> OrderRepository {
        let svc = DbService::memory().await.expect("in-memory db");
        OrderRepository::new(svc.db)
    }

    #[tokio::test]
    async fn test_create_find_delete() {
        let repo = test_repo().await;
        let user = make_record_id("user", "alice");
        let product = make_record_id("product", "p1");

        let created = repo
            .create(order_for(&user, &product, 999.0, OrderStatus::Processing))
            .await
            .unwrap();
        let id = created.id.as_ref().unwrap().to_string();

        let found = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.total_price, 999.0);
        assert_eq!(found.user, user);
        assert_eq!(found.items[0].product, product);

        repo.delete(&id).await.unwrap();
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_user_scoped() {
        let repo = test_repo().await;
        let alice = make_record_id("user", "alice");
        let bob = make_record_id("user", "bob");
        let product = make_record_id("product", "p1");

        repo.create(order_for(&alice, &product, 100.0, OrderStatus::Processing))
            .await
            .unwrap();
        repo.create(order_for(&alice, &product, 200.0, OrderStatus::Processing))
            .await
            .unwrap();
        repo.create(order_for(&bob, &product, 300.0, OrderStatus::Processing))
            .await
            .unwrap();

        assert_eq!(repo.find_by_user(&alice).await.unwrap().len(), 2);
        assert_eq!(repo.find_by_user(&bob).await.unwrap().len(), 1);
        assert_eq!(repo.find_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delivered_containing_probe() {
        let repo = test_repo().await;
        let alice = make_record_id("user", "alice");
        let bob = make_record_id("user", "bob");
        let p1 = make_record_id("product", "p1");
        let p2 = make_record_id("product", "p2");

        repo.create(order_for(&alice, &p1, 100.0, OrderStatus::Delivered))
            .await
            .unwrap();
        repo.create(order_for(&alice, &p2, 100.0, OrderStatus::Processing))
            .await
            .unwrap();

        // Delivered order containing p1
        assert!(repo.has_delivered_containing(&alice, &p1).await.unwrap());
        // p2 order exists but is not delivered
        assert!(!repo.has_delivered_containing(&alice, &p2).await.unwrap());
        // Bob never ordered anything
        assert!(!repo.has_delivered_containing(&bob, &p1).await.unwrap());
    }

    #[tokio::test]
    async fn test_aggregations() {
        let repo = test_repo().await;
        let alice = make_record_id("user", "alice");
        let bob = make_record_id("user", "bob");
        let product = make_record_id("product", "p1");

        repo.create(order_for(&alice, &product, 100.0, OrderStatus::Delivered))
            .await
            .unwrap();
        repo.create(order_for(&alice, &product, 250.0, OrderStatus::Processing))
            .await
            .unwrap();
        repo.create(order_for(&bob, &product, 300.0, OrderStatus::Processing))
            .await
            .unwrap();

        assert_eq!(repo.count_all().await.unwrap(), 3);
        assert!((repo.sum_total().await.unwrap() - 650.0).abs() < 1e-9);

        let mut totals = repo.customer_totals().await.unwrap();
        totals.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap());
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].user, alice);
        assert!((totals[0].total - 350.0).abs() < 1e-9);
        assert_eq!(totals[0].orders, 2);

        assert_eq!(repo.paid_orders().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_aggregations_default_to_zero() {
        let repo = test_repo().await;
        assert_eq!(repo.count_all().await.unwrap(), 0);
        assert_eq!(repo.sum_total().await.unwrap(), 0.0);
        assert!(repo.customer_totals().await.unwrap().is_empty());
    }
}
