//! Sales Reporting
//!
//! Read-only aggregations over historical orders: totals, per-customer
//! spend, per-calendar-month revenue. No mutation, no invariants to
//! maintain - the grouping happens in the database where SurrealQL is a
//! natural fit, with the month bucketing composed in Rust from a plain
//! projection.

use chrono::{DateTime, Datelike};
use std::collections::BTreeMap;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use serde::Serialize;
use shared::{AppError, AppResult};

use crate::db::repository::{OrderRepository, UserRepository};

/// Short month labels, 1-indexed via [`month_label`]
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Map a 1-indexed calendar month to its short label
pub fn month_label(month: u32) -> &'static str {
    MONTH_LABELS
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("???")
}

/// Per-customer spend row (inner join: customers with zero orders are
/// absent, orders whose user was deleted are dropped)
#[derive(Debug, Clone, Serialize)]
pub struct CustomerSales {
    pub user_id: String,
    pub name: String,
    pub username: String,
    pub total: f64,
    pub orders: i64,
}

/// Revenue of one calendar month
#[derive(Debug, Clone, Serialize)]
pub struct MonthlySales {
    pub year: i32,
    /// 1-indexed calendar month
    pub month: u32,
    pub label: String,
    pub total: f64,
}

pub struct SalesReporting {
    orders: OrderRepository,
    users: UserRepository,
}

impl SalesReporting {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }

    /// Total order count
    pub async fn total_orders(&self) -> AppResult<u64> {
        self.orders.count_all().await.map_err(AppError::from)
    }

    /// Sum of total_price across all orders
    pub async fn total_sales(&self) -> AppResult<f64> {
        self.orders.sum_total().await.map_err(AppError::from)
    }

    /// Per-customer total spend, sorted descending by total
    pub async fn customer_sales(&self) -> AppResult<Vec<CustomerSales>> {
        let rows = self.orders.customer_totals().await.map_err(AppError::from)?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            // Inner join semantics: skip orders whose user record is gone
            let Some(user) = self
                .users
                .find_by_id(&row.user.to_string())
                .await
                .map_err(AppError::from)?
            else {
                continue;
            };
            result.push(CustomerSales {
                user_id: row.user.to_string(),
                name: user.name,
                username: user.username,
                total: row.total,
                orders: row.orders,
            });
        }

        result.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal));
        Ok(result)
    }

    /// Per-calendar-month revenue, grouped by year+month of the payment
    /// timestamp, sorted chronologically. Unpaid orders are excluded.
    pub async fn sales_per_month(&self) -> AppResult<Vec<MonthlySales>> {
        let rows = self.orders.paid_orders().await.map_err(AppError::from)?;

        let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for row in rows {
            let Some(paid) = DateTime::from_timestamp_millis(row.paid_at) else {
                continue;
            };
            *buckets
                .entry((paid.year(), paid.month()))
                .or_insert(0.0) += row.total_price;
        }

        Ok(buckets
            .into_iter()
            .map(|((year, month), total)| MonthlySales {
                year,
                month,
                label: month_label(month).to_string(),
                total,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use surrealdb::RecordId;

    use crate::db::DbService;
    use crate::db::models::{
        Order, OrderItem, OrderStatus, PaymentInfo, PaymentStatus, Role, ShippingInfo, User,
    };
    use crate::db::repository::make_record_id;

    #[test]
    fn test_month_labels_are_exact() {
        let expected = [
            (1, "Jan"),
            (2, "Feb"),
            (3, "Mar"),
            (4, "Apr"),
            (5, "May"),
            (6, "Jun"),
            (7, "Jul"),
            (8, "Aug"),
            (9, "Sep"),
            (10, "Oct"),
            (11, "Nov"),
            (12, "Dec"),
        ];
        assert_eq!(MONTH_LABELS.len(), 12);
        for (month, label) in expected {
            assert_eq!(month_label(month), label);
        }
        // 1-indexed: 0 and 13 are out of range
        assert_eq!(month_label(0), "???");
        assert_eq!(month_label(13), "???");
    }

    struct Fixture {
        reporting: SalesReporting,
        orders: OrderRepository,
        users: UserRepository,
    }

    async fn fixture() -> Fixture {
        let svc = DbService::memory().await.expect("in-memory db");
        Fixture {
            reporting: SalesReporting::new(svc.db.clone()),
            orders: OrderRepository::new(svc.db.clone()),
            users: UserRepository::new(svc.db),
        }
    }

    async fn seed_user(fx: &Fixture, name: &str, username: &str) -> RecordId {
        fx.users
            .create(User {
                id: None,
                subject: Some(format!("idp|{username}")),
                name: name.to_string(),
                username: username.to_string(),
                username_lower: username.to_lowercase(),
                email: Some(format!("{username}@example.com")),
                hash_pass: None,
                avatar: None,
                role: Role::User,
                deactivated: false,
                created_at: shared::util::now_millis(),
            })
            .await
            .unwrap()
            .id
            .unwrap()
    }

    fn millis(year: i32, month: u32, day: u32) -> i64 {
        chrono::Utc
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    async fn seed_order(fx: &Fixture, user: &RecordId, total: f64, paid_at: Option<i64>) {
        fx.orders
            .create(Order {
                id: None,
                user: user.clone(),
                items: vec![OrderItem {
                    product: make_record_id("product", "p1"),
                    name: "Swift 14".to_string(),
                    price: total,
                    quantity: 1,
                    image: None,
                }],
                shipping: ShippingInfo {
                    address: "1 Main St".to_string(),
                    city: "Springfield".to_string(),
                    postal_code: "12345".to_string(),
                    country: "US".to_string(),
                    phone: "555-0100".to_string(),
                },
                items_price: total,
                tax_price: 0.0,
                shipping_price: 0.0,
                total_price: total,
                payment: PaymentInfo {
                    method: "card".to_string(),
                    status: if paid_at.is_some() {
                        PaymentStatus::Paid
                    } else {
                        PaymentStatus::Pending
                    },
                },
                status: OrderStatus::Processing,
                created_at: shared::util::now_millis(),
                paid_at,
                delivered_at: None,
                cancelled_at: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_totals() {
        let fx = fixture().await;
        let alice = seed_user(&fx, "Alice", "alice").await;

        seed_order(&fx, &alice, 100.0, None).await;
        seed_order(&fx, &alice, 250.5, None).await;

        assert_eq!(fx.reporting.total_orders().await.unwrap(), 2);
        assert!((fx.reporting.total_sales().await.unwrap() - 350.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_customer_sales_sorted_and_joined() {
        let fx = fixture().await;
        let alice = seed_user(&fx, "Alice", "alice").await;
        let bob = seed_user(&fx, "Bob", "bob").await;
        // Carol exists but never ordered: absent from the report
        seed_user(&fx, "Carol", "carol").await;

        seed_order(&fx, &alice, 100.0, None).await;
        seed_order(&fx, &alice, 200.0, None).await;
        seed_order(&fx, &bob, 500.0, None).await;

        let report = fx.reporting.customer_sales().await.unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].username, "bob");
        assert!((report[0].total - 500.0).abs() < 1e-9);
        assert_eq!(report[1].username, "alice");
        assert!((report[1].total - 300.0).abs() < 1e-9);
        assert_eq!(report[1].orders, 2);
    }

    #[tokio::test]
    async fn test_customer_sales_drops_deleted_users() {
        let fx = fixture().await;
        let alice = seed_user(&fx, "Alice", "alice").await;
        let ghost = seed_user(&fx, "Ghost", "ghost").await;

        seed_order(&fx, &alice, 100.0, None).await;
        seed_order(&fx, &ghost, 900.0, None).await;

        fx.users.delete(&ghost.to_string()).await.unwrap();

        let report = fx.reporting.customer_sales().await.unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].username, "alice");
    }

    #[tokio::test]
    async fn test_sales_per_month_grouping() {
        let fx = fixture().await;
        let alice = seed_user(&fx, "Alice", "alice").await;

        seed_order(&fx, &alice, 100.0, Some(millis(2025, 1, 5))).await;
        seed_order(&fx, &alice, 150.0, Some(millis(2025, 1, 20))).await;
        seed_order(&fx, &alice, 300.0, Some(millis(2025, 3, 1))).await;
        seed_order(&fx, &alice, 40.0, Some(millis(2024, 12, 31))).await;
        // Unpaid order is excluded
        seed_order(&fx, &alice, 999.0, None).await;

        let report = fx.reporting.sales_per_month().await.unwrap();
        assert_eq!(report.len(), 3);

        // Chronological order across year boundaries
        assert_eq!((report[0].year, report[0].month), (2024, 12));
        assert_eq!(report[0].label, "Dec");
        assert!((report[0].total - 40.0).abs() < 1e-9);

        assert_eq!((report[1].year, report[1].month), (2025, 1));
        assert_eq!(report[1].label, "Jan");
        assert!((report[1].total - 250.0).abs() < 1e-9);

        assert_eq!((report[2].year, report[2].month), (2025, 3));
        assert_eq!(report[2].label, "Mar");
        assert!((report[2].total - 300.0).abs() < 1e-9);
    }
}
