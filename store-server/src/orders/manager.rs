//! Order Lifecycle Manager
//!
//! Owns the order state machine, coordinates stock with the Inventory
//! Adjuster, and triggers the best-effort notification chain.
//!
//! Side effects are asymmetric: stock mutation is synchronous and
//! completes (or is safely skipped on a missing product) before the call
//! returns; notification never blocks or fails the primary operation.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::RecordId;
use validator::Validate;

use shared::util::now_millis;
use shared::{AppError, AppResult, ErrorCode};

use crate::db::models::{Order, OrderCreate, OrderItem, OrderStatus, PaymentStatus};
use crate::db::repository::{OrderRepository, UserRepository, make_record_id};
use crate::inventory::{InventoryAdjuster, StockDirection};
use crate::orders::money;
use crate::orders::notify::{NotificationOutcome, Notifier};

pub struct OrderManager {
    orders: OrderRepository,
    users: UserRepository,
    inventory: InventoryAdjuster,
    notifier: Notifier,
}

impl OrderManager {
    pub fn new(db: Surreal<Db>, notifier: Notifier) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            inventory: InventoryAdjuster::new(db),
            notifier,
        }
    }

    /// Create an order from a checkout request.
    ///
    /// Persists the order, then synchronously decrements stock for every
    /// line item, then runs the notification chain. The outcome of the
    /// notification is returned beside the order, never as an error.
    pub async fn place_order(
        &self,
        user_id: &RecordId,
        payload: OrderCreate,
    ) -> AppResult<(Order, NotificationOutcome)> {
        payload
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        money::validate_line_items(&payload.items)?;
        money::validate_order_totals(&payload)?;

        let items: Vec<OrderItem> = payload
            .items
            .iter()
            .map(|i| OrderItem {
                product: make_record_id("product", &i.product),
                name: i.name.clone(),
                price: i.price,
                quantity: i.quantity,
                image: i.image.clone(),
            })
            .collect();

        let now = now_millis();
        let paid_at = match payload.payment.status {
            PaymentStatus::Paid => Some(now),
            PaymentStatus::Pending => None,
        };

        let order = Order {
            id: None,
            user: user_id.clone(),
            items,
            shipping: payload.shipping,
            items_price: payload.items_price,
            tax_price: payload.tax_price,
            shipping_price: payload.shipping_price,
            total_price: payload.total_price,
            payment: payload.payment,
            status: OrderStatus::Processing,
            created_at: now,
            paid_at,
            delivered_at: None,
            cancelled_at: None,
        };

        let order = self.orders.create(order).await.map_err(AppError::from)?;

        // Synchronous stock decrement; a missing product is skipped inside
        // the adjuster and never blocks the order
        for item in &order.items {
            self.inventory
                .adjust(&item.product, item.quantity, StockDirection::Subtract)
                .await;
        }

        let outcome = self.notify(&order).await;
        Ok((order, outcome))
    }

    /// Apply a status transition.
    ///
    /// DELIVERED and CANCELLED are terminal: updates against them are
    /// conflicts and leave the order unchanged. Cancelling reverses every
    /// line item's stock exactly once; delivering forces the payment to
    /// PAID (delivery implies collection, notably cash on delivery).
    pub async fn update_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
    ) -> AppResult<(Order, NotificationOutcome)> {
        let mut order = self
            .orders
            .find_by_id(order_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

        match order.status {
            OrderStatus::Delivered => {
                return Err(AppError::new(ErrorCode::OrderAlreadyDelivered));
            }
            OrderStatus::Cancelled => {
                return Err(AppError::new(ErrorCode::OrderAlreadyCancelled));
            }
            _ => {}
        }

        let now = now_millis();
        match new_status {
            OrderStatus::Cancelled => {
                // Return every line item to stock before the status flips;
                // the terminal-state guard above makes this run at most once
                for item in &order.items {
                    self.inventory
                        .adjust(&item.product, item.quantity, StockDirection::Add)
                        .await;
                }
                order.cancelled_at = Some(now);
            }
            OrderStatus::Delivered => {
                order.delivered_at = Some(now);
                order.payment.status = PaymentStatus::Paid;
                if order.paid_at.is_none() {
                    order.paid_at = Some(now);
                }
            }
            _ => {}
        }
        order.status = new_status;

        let rid = order
            .id
            .clone()
            .unwrap_or_else(|| make_record_id("order", order_id));
        let order = self
            .orders
            .apply_status(&rid, &order)
            .await
            .map_err(AppError::from)?;

        let outcome = self.notify(&order).await;
        Ok((order, outcome))
    }

    /// Unconditional hard delete. Does not reverse inventory (documented
    /// gap, see DESIGN.md).
    pub async fn delete_order(&self, order_id: &str) -> AppResult<Order> {
        self.orders
            .delete(order_id)
            .await
            .map_err(|e| match e {
                crate::db::repository::RepoError::NotFound(_) => {
                    AppError::new(ErrorCode::OrderNotFound)
                }
                other => AppError::from(other),
            })
    }

    async fn notify(&self, order: &Order) -> NotificationOutcome {
        let user = match self.users.find_by_id(&order.user.to_string()).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                let outcome =
                    NotificationOutcome::Failed("ordering user not found".to_string());
                outcome.log(&order.id.as_ref().map(|t| t.to_string()).unwrap_or_default());
                return outcome;
            }
            Err(e) => {
                let outcome = NotificationOutcome::Failed(format!("user lookup: {e}"));
                outcome.log(&order.id.as_ref().map(|t| t.to_string()).unwrap_or_default());
                return outcome;
            }
        };
        self.notifier.order_status(order, &user).await
    }
}
